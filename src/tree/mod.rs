//! Red-black tree engine
//!
//! This module provides the live tree and everything needed to inspect it:
//! - [`node`]: node records, colors and the arena that owns them
//! - [`engine`]: [`RedBlackTree`] with insertion, lookup, rotation and repair
//! - [`view`]: the read-only [`TreeView`] shared with snapshots
//! - [`validate`]: invariant checks over any [`TreeView`]
//! - [`errors`]: [`TreeError`] and [`InvariantViolation`]
//!
//! # Invariants
//!
//! Once an insertion returns:
//! 1. In-order keys are strictly increasing (no duplicates)
//! 2. The root is black
//! 3. No red node has a red child
//! 4. Every path from a node to an empty position crosses the same number of
//!    black nodes
//!
//! New nodes always start red; only repair and the final root step paint
//! nodes black.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod node;
pub mod validate;
pub mod view;

pub use engine::RedBlackTree;
pub use errors::{InvariantViolation, TreeError};
pub use node::{Color, NodeId, Side};
pub use view::{NodeRef, TreeView};
