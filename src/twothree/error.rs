use std::fmt::Debug;
use thiserror::Error;

/// Failures that reject an operation before the tree is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("no tree handle was supplied")]
    MissingTree,

    #[error("key {0} is reserved as the empty slot marker and cannot be stored")]
    ReservedKey(String),

    // a backtrack entry outlived the node it pointed at
    #[error("ancestor node was dropped while it was still on the backtrack stack")]
    DetachedAncestor,
}

impl TreeError {
    pub(crate) fn reserved<K: Debug>(key: &K) -> Self {
        TreeError::ReservedKey(format!("{:?}", key))
    }
}

/// Result of a successful insert call. A duplicate is not an error, the tree
/// is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    Duplicate,
}

/// Result of a successful delete call. Deleting a key that is not present
/// leaves the tree untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Absent,
}

/// A broken structural rule, found by `TwoThreeTree::check_invariants`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("node {keys} holds {count} keys")]
    KeyCount { keys: String, count: usize },

    #[error("node {keys} has {children} children")]
    ChildCount { keys: String, children: usize },

    #[error("keys {keys} are not strictly ascending")]
    Unsorted { keys: String },

    #[error("key {key} falls outside the range its ancestors allow")]
    OutOfRange { key: String },

    #[error("leaf {keys} sits at depth {depth} but other leaves sit at depth {expected}")]
    UnevenLeaves {
        keys: String,
        depth: usize,
        expected: usize,
    },

    #[error("node {keys} has a wrong root flag")]
    RootFlag { keys: String },

    #[error("tree records {recorded} keys but holds {actual}")]
    Length { recorded: usize, actual: usize },
}
