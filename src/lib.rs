//! # Introduction
//!
//! rbtrace is a red-black tree that records every elementary structural
//! change it makes. Each insertion links a red node, repairs the tree with
//! recolors and rotations, and captures an independent [`snapshot::Snapshot`]
//! of the whole tree after every one of those steps. A consumer (typically a
//! renderer) drains the snapshots after each insertion and replays them.
//!
//! ## Pipeline
//!
//! ```text
//! insert → link red node → snapshot → repair (snapshot per step) → root black → snapshot
//! ```
//!
//! 1. [`tree`] — the engine: [`tree::RedBlackTree`], invariant checks and the
//!    read-only [`tree::TreeView`] used to walk trees.
//! 2. [`snapshot`] — [`snapshot::Snapshot`] copies tagged with the
//!    [`snapshot::Step`] that produced them, queued in a
//!    [`snapshot::SnapshotQueue`] with an optional memory budget.
//! 3. [`config`] — [`config::TreeConfig`] for recording and budget settings.
//!
//! ## Example
//!
//! ```
//! use rbtrace::snapshot::Step;
//! use rbtrace::tree::{Color, RedBlackTree, TreeView};
//!
//! let mut tree = RedBlackTree::new();
//! for key in [10, 20, 30] {
//!     tree.insert(key).unwrap();
//! }
//!
//! let root = tree.root().unwrap();
//! assert_eq!(*root.key(), 20);
//! assert_eq!(root.color(), Color::Black);
//!
//! let steps: Vec<Step> = tree.drain_snapshots().iter().map(|s| s.step()).collect();
//! assert!(matches!(steps.last(), Some(Step::RootBlackened { .. })));
//! ```
//!
//! Deletion is not supported.

pub mod config;
pub mod snapshot;
pub mod tree;
