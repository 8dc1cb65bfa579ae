use crate::twothree::{MAX_CHILDREN, MAX_KEYS};
use std::cell::RefCell;
use std::fmt::{Debug, Display, Formatter};
use std::mem;
use std::rc::{Rc, Weak};
use tracing::debug;

pub type NodeRef<K> = Rc<RefCell<Node<K>>>;
pub(super) type WeakNodeRef<K> = Weak<RefCell<Node<K>>>;

/// A 2-3 tree node. Leaves have no children, internal nodes have exactly one
/// more child than keys. Every child slot holds the only strong reference to
/// its subtree.
#[derive(Debug)]
pub struct Node<K> {
    pub(super) keys: Vec<K>,
    pub(super) children: Vec<NodeRef<K>>,
    pub(super) is_root: bool,
}

/// Produced by a node that overflowed: `carry` moves up into the parent and
/// `sibling` becomes the parent's child right after the node that split.
#[derive(Debug)]
pub(super) struct Split<K> {
    pub(super) carry: K,
    pub(super) sibling: NodeRef<K>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

/// How a parent repaired a child that lost its last key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Rebalance {
    Borrowed(Side),
    Merged(Side),
}

/// Structural snapshot of a subtree, used to compare shapes in assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape<K> {
    pub keys: Vec<K>,
    pub children: Vec<Shape<K>>,
}

impl<K> Shape<K> {
    pub fn leaf(keys: Vec<K>) -> Self {
        Shape {
            keys,
            children: Vec::new(),
        }
    }

    pub fn node(keys: Vec<K>, children: Vec<Shape<K>>) -> Self {
        Shape { keys, children }
    }
}

impl<K: Ord + Clone> Node<K> {
    pub(super) fn new_leaf(key: K, is_root: bool) -> NodeRef<K> {
        Rc::new(RefCell::new(Node {
            keys: vec![key],
            children: Vec::new(),
            is_root,
        }))
    }

    /// Root created when the old root splits: `left` is the old root and
    /// `middle` is its new sibling.
    pub(super) fn new_root(carry: K, left: NodeRef<K>, middle: NodeRef<K>) -> NodeRef<K> {
        left.borrow_mut().is_root = false;
        Rc::new(RefCell::new(Node {
            keys: vec![carry],
            children: vec![left, middle],
            is_root: true,
        }))
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.keys.len() >= MAX_KEYS
    }

    pub fn is_vacant(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, branch: usize) -> Option<NodeRef<K>> {
        self.children.get(branch).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub(super) fn position_of(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Child slot a key that is not resident here belongs under: left when it
    /// is below the first key, middle between the two keys, right above the
    /// second.
    pub(super) fn branch_for(&self, key: &K) -> usize {
        self.keys.iter().take_while(|k| *k < key).count()
    }

    /// Places `key` into a leaf, splitting it when it already held two keys.
    pub(super) fn insert_into_leaf(&mut self, key: K) -> Option<Split<K>> {
        let pos = self.branch_for(&key);
        self.keys.insert(pos, key);

        if self.keys.len() <= MAX_KEYS {
            return None;
        }

        Some(self.split())
    }

    /// Takes in the result of a child split at `branch`. The carried key lands
    /// at the same index as the child that split, and the new sibling right
    /// after it.
    pub(super) fn absorb(&mut self, branch: usize, split: Split<K>) -> Option<Split<K>> {
        self.keys.insert(branch, split.carry);
        self.children.insert(branch + 1, split.sibling);

        if self.keys.len() <= MAX_KEYS {
            return None;
        }

        Some(self.split())
    }

    /// Splits a node holding three keys: the smallest stays, the median is
    /// carried up and the largest moves into a new sibling together with the
    /// two rightmost children.
    pub(super) fn split(&mut self) -> Split<K> {
        debug_assert_eq!(self.keys.len(), MAX_KEYS + 1);

        let split_keys = self.keys.split_off(2);
        let carry = self.keys.remove(1);

        // an overflowing link holds four children, two go to the sibling
        let sibling_children = if self.children.len() == MAX_CHILDREN + 1 {
            self.children.split_off(2)
        } else {
            Vec::new()
        };

        Split {
            carry,
            sibling: Rc::new(RefCell::new(Node {
                keys: split_keys,
                children: sibling_children,
                is_root: false,
            })),
        }
    }

    /// Repairs the child at `branch` after it lost its last key. A sibling
    /// with two keys lends one through this node; otherwise the child is
    /// merged with a sibling and this node gives up one key and one child.
    pub(super) fn fix_underflow(&mut self, branch: usize) -> Rebalance {
        let right = branch + 1;
        let has_right = right < self.children.len();

        if has_right && self.children[right].borrow().is_full() {
            self.borrow_from_right(branch);
            return Rebalance::Borrowed(Side::Right);
        }
        if branch > 0 && self.children[branch - 1].borrow().is_full() {
            self.borrow_from_left(branch);
            return Rebalance::Borrowed(Side::Left);
        }

        if has_right {
            self.merge_with_right(branch);
            Rebalance::Merged(Side::Right)
        } else {
            self.merge_into_left(branch);
            Rebalance::Merged(Side::Left)
        }
    }

    fn borrow_from_right(&mut self, branch: usize) {
        let mut hole = self.children[branch].borrow_mut();
        let mut sibling = self.children[branch + 1].borrow_mut();

        let lifted = sibling.keys.remove(0);
        let lowered = mem::replace(&mut self.keys[branch], lifted);
        hole.keys.push(lowered);

        if !sibling.children.is_empty() {
            let adopted = sibling.children.remove(0);
            hole.children.push(adopted);
        }
        debug!("rotated a key left into child {}", branch);
    }

    fn borrow_from_left(&mut self, branch: usize) {
        let mut hole = self.children[branch].borrow_mut();
        let mut sibling = self.children[branch - 1].borrow_mut();

        if let Some(lifted) = sibling.keys.pop() {
            let lowered = mem::replace(&mut self.keys[branch - 1], lifted);
            hole.keys.insert(0, lowered);
        }

        if let Some(adopted) = sibling.children.pop() {
            hole.children.insert(0, adopted);
        }
        debug!("rotated a key right into child {}", branch);
    }

    fn merge_with_right(&mut self, branch: usize) {
        let hole = self.children.remove(branch);
        let separator = self.keys.remove(branch);

        let orphans = mem::take(&mut hole.borrow_mut().children);
        let mut sibling = self.children[branch].borrow_mut();
        sibling.keys.insert(0, separator);
        sibling.children.splice(0..0, orphans);
        debug!("merged child {} into its right sibling", branch);
    }

    fn merge_into_left(&mut self, branch: usize) {
        let hole = self.children.remove(branch);
        let separator = self.keys.remove(branch - 1);

        let orphans = mem::take(&mut hole.borrow_mut().children);
        let mut sibling = self.children[branch - 1].borrow_mut();
        sibling.keys.push(separator);
        sibling.children.extend(orphans);
        debug!("merged child {} into its left sibling", branch);
    }

    pub fn shape(&self) -> Shape<K> {
        Shape {
            keys: self.keys.clone(),
            children: self
                .children
                .iter()
                .map(|child| child.borrow().shape())
                .collect(),
        }
    }
}

impl<K: Debug> Node<K> {
    pub(super) fn fmt_depth(&self, f: &mut Formatter<'_>, depth: usize) -> std::fmt::Result {
        f.write_str(&"  ".repeat(depth))?;
        f.write_str(&format!("{:?}\n", self.keys))?;
        for child in &self.children {
            child.borrow().fmt_depth(f, depth + 1)?;
        }
        Ok(())
    }
}

impl<K: Debug> Display for Node<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_depth(f, 0)
    }
}
