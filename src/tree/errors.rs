//! Error types for the tree engine
//!
//! [`TreeError`] is what callers of [`insert`](super::RedBlackTree::insert),
//! [`contains`](super::RedBlackTree::contains) and
//! [`SnapshotQueue::push`](crate::snapshot::SnapshotQueue::push) can see. [`InvariantViolation`]
//! is produced only by the validator and describes which red-black or
//! search-order rule a tree (live or snapshot) breaks.
//!
//! Duplicate keys are not an error. Rotating around a node that lacks the
//! required child is a contract violation and panics instead.

use super::node::NodeId;
use thiserror::Error;

/// Errors returned by tree operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Two keys could not be ordered (e.g. a NaN float)
    #[error("key is not comparable with the keys already in the tree")]
    Incomparable,

    /// The snapshot queue is over budget. Only the queue itself reports this;
    /// the tree counts such steps as dropped.
    #[error("snapshot memory limit exceeded: {current} bytes used, limit is {limit}")]
    SnapshotLimitExceeded { current: usize, limit: usize },
}

/// A broken tree invariant, as reported by the validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("node {node} does not sort strictly after {previous}")]
    OutOfOrder { node: NodeId, previous: NodeId },

    #[error("root {root} is red")]
    RedRoot { root: NodeId },

    #[error("red node {child} has red parent {parent}")]
    RedRedEdge { parent: NodeId, child: NodeId },

    #[error("black height differs under {node}: left {left}, right {right}")]
    BlackHeightMismatch {
        node: NodeId,
        left: usize,
        right: usize,
    },

    #[error("node {node} does not point back to its parent {expected:?}")]
    BrokenParentLink {
        node: NodeId,
        expected: Option<NodeId>,
    },

    #[error("node {node} is reachable more than once")]
    Revisited { node: NodeId },
}
