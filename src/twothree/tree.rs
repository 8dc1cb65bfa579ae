use crate::twothree::error::{Insertion, InvariantViolation, Removal, TreeError};
use crate::twothree::node::{Node, NodeRef, Rebalance, Shape, WeakNodeRef};
use crate::twothree::stack::BacktrackStack;
use crate::twothree::traverse::Traversal;
use crate::twothree::{TraversalOrder, TreeKey, MAX_KEYS};
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// An ancestor seen on the way down and the child slot the descent left it by.
struct Step<K> {
    node: WeakNodeRef<K>,
    branch: usize,
}

impl<K> Step<K> {
    fn new(node: &NodeRef<K>, branch: usize) -> Self {
        Step {
            node: Rc::downgrade(node),
            branch,
        }
    }

    fn upgrade(&self) -> Result<NodeRef<K>, TreeError> {
        self.node.upgrade().ok_or(TreeError::DetachedAncestor)
    }
}

type Path<K> = BacktrackStack<Step<K>>;

/// Self balancing 2-3 search tree holding distinct keys.
///
/// Mutations descend like a search while recording ancestors on a
/// [`BacktrackStack`] that lives only for that call, edit the leaf they reach
/// and then unwind the stack, splitting (insert) or borrowing and merging
/// (delete) until some level absorbs the change.
#[derive(Debug)]
pub struct TwoThreeTree<K> {
    root: Option<NodeRef<K>>,
    len: usize,
}

impl<K: TreeKey> TwoThreeTree<K> {
    pub fn new() -> Self {
        TwoThreeTree { root: None, len: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of node levels, 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root.clone();
        while let Some(node) = current {
            height += 1;
            current = node.borrow().child(0);
        }
        height
    }

    pub fn root(&self) -> Option<NodeRef<K>> {
        self.root.clone()
    }

    pub fn root_keys(&self) -> Vec<K> {
        match &self.root {
            Some(root) => root.borrow().keys().to_vec(),
            None => Vec::new(),
        }
    }

    pub fn shape(&self) -> Option<Shape<K>> {
        self.root.as_ref().map(|root| root.borrow().shape())
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Finds the node holding `key`.
    pub fn search(&self, key: &K) -> Option<NodeRef<K>> {
        let mut current = self.root.clone()?;
        loop {
            let child = {
                let node = current.borrow();
                if node.contains(key) {
                    break;
                }
                node.child(node.branch_for(key))
            };
            current = child?;
        }
        Some(current)
    }

    pub fn insert(&mut self, key: K) -> Result<Insertion, TreeError> {
        if key.is_reserved() {
            return Err(TreeError::reserved(&key));
        }

        let root = match &self.root {
            Some(root) => root.clone(),
            None => {
                debug!(?key, "planting first root");
                self.root = Some(Node::new_leaf(key, true));
                self.len = 1;
                return Ok(Insertion::Inserted);
            }
        };

        if self.contains(&key) {
            debug!(?key, "key already present, nothing inserted");
            return Ok(Insertion::Duplicate);
        }

        let mut path = Path::new();
        let leaf = Self::descend_to_leaf(root, &key, &mut path);

        let mut splitting = leaf.clone();
        let mut pending = leaf.borrow_mut().insert_into_leaf(key);

        while let Some(split) = pending.take() {
            match path.pop() {
                Some(step) => {
                    let parent = step.upgrade()?;
                    debug!(carry = ?split.carry, branch = step.branch, "carrying split key into parent");
                    pending = parent.borrow_mut().absorb(step.branch, split);
                    splitting = parent;
                }
                None => {
                    debug!(carry = ?split.carry, "root split, growing a level");
                    self.root = Some(Node::new_root(split.carry, splitting.clone(), split.sibling));
                }
            }
        }

        path.drain();
        self.len += 1;
        Ok(Insertion::Inserted)
    }

    pub fn delete(&mut self, key: &K) -> Result<Removal, TreeError> {
        if key.is_reserved() {
            return Err(TreeError::reserved(key));
        }

        let root = match &self.root {
            Some(root) => root.clone(),
            None => {
                debug!(?key, "tree is empty, nothing deleted");
                return Ok(Removal::Absent);
            }
        };

        let mut path = Path::new();
        let (holder, slot) = match Self::find_holder(root, key, &mut path) {
            Some(found) => found,
            None => {
                debug!(?key, "key not present, nothing deleted");
                return Ok(Removal::Absent);
            }
        };

        let leaf = if holder.borrow().is_leaf() {
            holder.borrow_mut().keys.remove(slot);
            holder
        } else {
            Self::take_successor(&holder, slot, &mut path)
        };

        let emptied = leaf.borrow().is_vacant();
        drop(leaf);
        if emptied {
            self.rebalance(&mut path)?;
        }

        path.drain();
        self.len -= 1;
        Ok(Removal::Removed)
    }

    pub fn iter(&self, order: TraversalOrder) -> Traversal<K> {
        Traversal::new(self.root.clone(), order)
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<K> {
        self.iter(TraversalOrder::Inorder).collect()
    }

    fn descend_to_leaf(root: NodeRef<K>, key: &K, path: &mut Path<K>) -> NodeRef<K> {
        let mut current = root;
        loop {
            let next = {
                let node = current.borrow();
                let branch = node.branch_for(key);
                node.child(branch).map(|child| (branch, child))
            };
            match next {
                Some((branch, child)) => {
                    trace!(branch, "descending");
                    path.push(Step::new(&current, branch));
                    current = child;
                }
                None => return current,
            }
        }
    }

    // node holding `key` and the key's slot in it
    fn find_holder(root: NodeRef<K>, key: &K, path: &mut Path<K>) -> Option<(NodeRef<K>, usize)> {
        let mut current = root;
        loop {
            let (slot, branch) = {
                let node = current.borrow();
                (node.position_of(key), node.branch_for(key))
            };
            if let Some(slot) = slot {
                return Some((current, slot));
            }

            let child = current.borrow().child(branch)?;
            trace!(branch, "descending");
            path.push(Step::new(&current, branch));
            current = child;
        }
    }

    /// Replaces the internal key at `slot` with its in-order successor and
    /// removes the successor from the leaf it came from, which is returned.
    fn take_successor(holder: &NodeRef<K>, slot: usize, path: &mut Path<K>) -> NodeRef<K> {
        let mut current = holder.clone();
        let mut branch = slot + 1;
        loop {
            let child = current.borrow().child(branch);
            match child {
                Some(child) => {
                    path.push(Step::new(&current, branch));
                    current = child;
                    branch = 0;
                }
                None => break,
            }
        }

        let successor = current.borrow_mut().keys.remove(0);
        debug!(?successor, "promoting in-order successor");
        holder.borrow_mut().keys[slot] = successor;
        current
    }

    /// Walks back up from an emptied node until a borrow settles it, a
    /// merge leaves its parent with a key, or the root itself empties.
    fn rebalance(&mut self, path: &mut Path<K>) -> Result<(), TreeError> {
        while let Some(step) = path.pop() {
            let parent = step.upgrade()?;
            let outcome = parent.borrow_mut().fix_underflow(step.branch);
            debug!(?outcome, branch = step.branch, "repaired emptied child");

            if let Rebalance::Borrowed(_) = outcome {
                return Ok(());
            }
            if !parent.borrow().is_vacant() {
                return Ok(());
            }
        }

        self.collapse_root();
        Ok(())
    }

    fn collapse_root(&mut self) {
        let vacant = match &self.root {
            Some(root) => root.borrow().is_vacant(),
            None => false,
        };
        if !vacant {
            return;
        }

        let promoted = match self.root.take() {
            Some(old_root) => {
                let child = old_root.borrow_mut().children.pop();
                child
            }
            None => None,
        };

        match &promoted {
            Some(new_root) => {
                new_root.borrow_mut().is_root = true;
                debug!("root emptied, promoting its only child");
            }
            None => debug!("last key removed, tree is empty"),
        }
        self.root = promoted;
    }

    /// Verifies ordering, key counts, child counts, leaf depth, root flags
    /// and the recorded length.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let root = match &self.root {
            Some(root) => root,
            None if self.len == 0 => return Ok(()),
            None => {
                return Err(InvariantViolation::Length {
                    recorded: self.len,
                    actual: 0,
                })
            }
        };

        let mut audit = Audit {
            leaf_depth: None,
            count: 0,
        };
        audit.visit(root, 0, None, None, true)?;

        if audit.count != self.len {
            return Err(InvariantViolation::Length {
                recorded: self.len,
                actual: audit.count,
            });
        }
        Ok(())
    }
}

struct Audit {
    leaf_depth: Option<usize>,
    count: usize,
}

impl Audit {
    fn visit<K: TreeKey>(
        &mut self,
        node_ref: &NodeRef<K>,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        is_root: bool,
    ) -> Result<(), InvariantViolation> {
        let node = node_ref.borrow();
        let keys = format!("{:?}", node.keys());

        if node.keys().is_empty() || node.keys().len() > MAX_KEYS {
            return Err(InvariantViolation::KeyCount {
                keys,
                count: node.keys().len(),
            });
        }
        if !node.is_leaf() && node.child_count() != node.keys().len() + 1 {
            return Err(InvariantViolation::ChildCount {
                keys,
                children: node.child_count(),
            });
        }
        if node.keys().windows(2).any(|w| w[0] >= w[1]) {
            return Err(InvariantViolation::Unsorted { keys });
        }
        if node.is_root() != is_root {
            return Err(InvariantViolation::RootFlag { keys });
        }
        for key in node.keys() {
            let above = lower.map_or(true, |lo| key > lo);
            let below = upper.map_or(true, |hi| key < hi);
            if !(above && below) {
                return Err(InvariantViolation::OutOfRange {
                    key: format!("{:?}", key),
                });
            }
        }
        self.count += node.keys().len();

        if node.is_leaf() {
            return match self.leaf_depth {
                None => {
                    self.leaf_depth = Some(depth);
                    Ok(())
                }
                Some(expected) if expected == depth => Ok(()),
                Some(expected) => Err(InvariantViolation::UnevenLeaves {
                    keys,
                    depth,
                    expected,
                }),
            };
        }

        for (i, child) in node.children.iter().enumerate() {
            let lo = if i == 0 { lower } else { node.keys().get(i - 1) };
            let hi = node.keys().get(i).or(upper);
            self.visit(child, depth + 1, lo, hi, false)?;
        }
        Ok(())
    }
}

impl<K: TreeKey> Default for TwoThreeTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TreeKey> Extend<K> for TwoThreeTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            if let Err(e) = self.insert(key) {
                warn!("skipping key: {}", e);
            }
        }
    }
}

impl<K: TreeKey> FromIterator<K> for TwoThreeTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = TwoThreeTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Debug> Display for TwoThreeTree<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            None => f.write_str("(empty)\n"),
            Some(node) => node.borrow().fmt_depth(f, 0),
        }
    }
}
