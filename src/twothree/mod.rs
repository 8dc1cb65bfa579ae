//! In-memory 2-3 tree.
//!
//! Every node holds one or two keys and, unless it is a leaf, one more child
//! than keys. All leaves sit at the same depth. Balance is kept purely from
//! key counts: overflowing nodes split upward on insert and emptied nodes
//! borrow from or merge with a sibling on delete.

pub mod error;
pub mod node;
pub mod stack;
pub mod traverse;
pub mod tree;

use serde::Deserialize;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

pub use error::{InvariantViolation, Insertion, Removal, TreeError};
pub use node::{Node, NodeRef, Shape};
pub use stack::BacktrackStack;
pub use traverse::Traversal;
pub use tree::TwoThreeTree;

const DEGREE: usize = 3;
pub const MAX_KEYS: usize = DEGREE - 1;
pub const MAX_CHILDREN: usize = DEGREE;

/// Signed keys reserve this value: it marked an empty key slot in the
/// original node layout and is still refused as a real key.
pub const EMPTY_SLOT: i64 = -1;

/// Keys storable in a [`TwoThreeTree`].
pub trait TreeKey: Ord + Clone + Debug {
    /// Whether this value is the reserved empty slot marker.
    fn is_reserved(&self) -> bool {
        false
    }
}

macro_rules! signed_keys {
    ($($t:ty),*) => {
        $(impl TreeKey for $t {
            fn is_reserved(&self) -> bool {
                *self as i64 == EMPTY_SLOT
            }
        })*
    };
}

macro_rules! unreserved_keys {
    ($($t:ty),*) => {
        $(impl TreeKey for $t {})*
    };
}

signed_keys!(i8, i16, i32, i64, isize);
unreserved_keys!(u8, u16, u32, u64, usize, char, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TraversalOrder {
    Preorder,
    Inorder,
    Postorder,
}

impl TraversalOrder {
    pub const ALL: [TraversalOrder; 3] = [
        TraversalOrder::Preorder,
        TraversalOrder::Inorder,
        TraversalOrder::Postorder,
    ];
}

impl Display for TraversalOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TraversalOrder::Preorder => f.write_str("preorder"),
            TraversalOrder::Inorder => f.write_str("inorder"),
            TraversalOrder::Postorder => f.write_str("postorder"),
        }
    }
}

impl FromStr for TraversalOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preorder" | "pre" => Ok(TraversalOrder::Preorder),
            "inorder" | "in" => Ok(TraversalOrder::Inorder),
            "postorder" | "post" => Ok(TraversalOrder::Postorder),
            other => Err(format!("unknown traversal order: {}", other)),
        }
    }
}

// Handle style entry points. `None` stands for a missing tree handle.

pub fn insert<K: TreeKey>(tree: Option<&mut TwoThreeTree<K>>, key: K) -> Result<Insertion, TreeError> {
    tree.ok_or(TreeError::MissingTree)?.insert(key)
}

pub fn delete<K: TreeKey>(tree: Option<&mut TwoThreeTree<K>>, key: &K) -> Result<Removal, TreeError> {
    tree.ok_or(TreeError::MissingTree)?.delete(key)
}

/// Node holding `key`. A missing tree is treated as an empty one.
pub fn search<K: TreeKey>(tree: Option<&TwoThreeTree<K>>, key: &K) -> Option<NodeRef<K>> {
    tree.and_then(|t| t.search(key))
}

pub fn traverse<K: TreeKey>(tree: Option<&TwoThreeTree<K>>, order: TraversalOrder) -> Vec<K> {
    match tree {
        Some(t) => t.iter(order).collect(),
        None => Vec::new(),
    }
}
