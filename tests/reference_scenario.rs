use twothree::config::DEFAULT_KEYS;
use twothree::twothree::{self as engine, Insertion, Removal, Shape, TraversalOrder, TreeError, TwoThreeTree};

fn l(keys: &[i32]) -> Shape<i32> {
    Shape::leaf(keys.to_vec())
}

fn n(keys: &[i32], children: Vec<Shape<i32>>) -> Shape<i32> {
    Shape::node(keys.to_vec(), children)
}

#[test]
fn reference_insertions_build_expected_tree() {
    let mut tree = TwoThreeTree::new();
    for key in [20, 30, 40, 50, 60, 11, 15, 70, 80] {
        assert_eq!(engine::insert(Some(&mut tree), key), Ok(Insertion::Inserted));
    }

    assert_eq!(
        tree.shape(),
        Some(n(
            &[30],
            vec![
                n(&[15], vec![l(&[11]), l(&[20])]),
                n(&[50, 70], vec![l(&[40]), l(&[60]), l(&[80])]),
            ]
        ))
    );
    assert_eq!(
        engine::traverse(Some(&tree), TraversalOrder::Inorder),
        vec![11, 15, 20, 30, 40, 50, 60, 70, 80]
    );

    assert_eq!(engine::delete(Some(&mut tree), &30), Ok(Removal::Removed));
    assert_eq!(tree.root_keys(), vec![40]);
    tree.check_invariants().unwrap();
    assert_eq!(tree.keys(), vec![11, 15, 20, 40, 50, 60, 70, 80]);
}

#[test]
fn driver_default_keys() {
    let mut tree: TwoThreeTree<i64> = TwoThreeTree::new();
    for key in DEFAULT_KEYS {
        assert_eq!(tree.insert(key), Ok(Insertion::Inserted));
        tree.check_invariants().unwrap();
    }

    let mut sorted = DEFAULT_KEYS.to_vec();
    sorted.sort();
    assert_eq!(tree.keys(), sorted);

    for key in DEFAULT_KEYS.iter().rev() {
        assert!(engine::search(Some(&tree), key).is_some());
        assert_eq!(tree.delete(key), Ok(Removal::Removed));
        tree.check_invariants().unwrap();
    }
    assert!(tree.is_empty());
}

#[test]
fn errors_are_distinct_from_informational_outcomes() {
    let mut tree: TwoThreeTree<i32> = [5, 10].into_iter().collect();

    assert_eq!(tree.insert(5), Ok(Insertion::Duplicate));
    assert_eq!(tree.delete(&7), Ok(Removal::Absent));
    assert!(matches!(tree.insert(-1), Err(TreeError::ReservedKey(_))));
    assert_eq!(engine::insert::<i32>(None, 3), Err(TreeError::MissingTree));
    assert_eq!(tree.keys(), vec![5, 10]);
}
