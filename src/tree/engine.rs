//! Red-black tree engine with step recording
//!
//! [`RedBlackTree`] owns the node arena and the pending [`SnapshotQueue`].
//! An insertion links a new red node, captures a snapshot, then repairs the
//! tree bottom-up, capturing again after every recolor and every rotation and
//! once more after the root is forced black.
//!
//! # Snapshot granularity
//!
//! In the straight-line case the parent/grandparent recolor happens just
//! before the rotation and is only visible in the rotation's snapshot; it
//! does not get a snapshot of its own.

use super::errors::{InvariantViolation, TreeError};
use super::node::{Color, Node, NodeArena, NodeId, Side};
use super::validate;
use super::view::TreeView;
use crate::config::TreeConfig;
use crate::snapshot::{Snapshot, SnapshotQueue, Step};
use log::{debug, trace, warn};
use std::cmp::Ordering;

/// Order two keys, failing when they cannot be compared
fn compare<K: PartialOrd>(a: &K, b: &K) -> Result<Ordering, TreeError> {
    a.partial_cmp(b).ok_or(TreeError::Incomparable)
}

/// A red-black tree that records each structural step
#[derive(Debug)]
pub struct RedBlackTree<K> {
    nodes: NodeArena<K>,
    root: Option<NodeId>,
    snapshots: SnapshotQueue<K>,
    config: TreeConfig,
    next_sequence: u64,
    // Set once the queue refuses a capture during the insertion in progress
    trace_cut: bool,
}

impl<K: PartialOrd + Clone> RedBlackTree<K> {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        RedBlackTree {
            nodes: NodeArena::new(),
            root: None,
            snapshots: SnapshotQueue::new(config.snapshot_memory_limit),
            config,
            next_sequence: 0,
            trace_cut: false,
        }
    }

    /// Membership test by iterative descent. Never records a snapshot.
    pub fn contains(&self, key: &K) -> Result<bool, TreeError> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match compare(key, &node.key)? {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Ok(true),
            };
        }
        Ok(false)
    }

    /// Insert `key` and rebalance.
    ///
    /// Returns `Ok(false)` without touching the tree or the snapshot queue
    /// when the key is already present. A full snapshot queue never fails
    /// the insertion: the steps it refuses are counted by
    /// [`dropped_snapshots`](Self::dropped_snapshots) instead.
    pub fn insert(&mut self, key: K) -> Result<bool, TreeError> {
        if self.contains(&key)? {
            debug!("insert: duplicate key ignored");
            return Ok(false);
        }

        self.trace_cut = false;
        let mut parent = None;
        let mut side = Side::Left;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            parent = Some(id);
            side = match compare(&key, &self.nodes[id].key)? {
                Ordering::Less => Side::Left,
                _ => Side::Right,
            };
            cursor = self.nodes[id].child(side);
        }

        let id = self.nodes.alloc(Node::new(key, parent));
        match parent {
            None => self.root = Some(id),
            Some(parent) => self.nodes[parent].set_child(side, Some(id)),
        }
        debug!("insert: linked {} under {:?} on the {:?}", id, parent, side);

        self.capture(Step::Inserted { node: id });
        self.fix_insert(id);
        Ok(true)
    }
}

impl<K: Clone> RedBlackTree<K> {
    /// Hand over every snapshot recorded since the last drain, oldest first
    pub fn drain_snapshots(&mut self) -> Vec<Snapshot<K>> {
        self.snapshots.drain()
    }

    /// Number of snapshots waiting to be drained
    pub fn pending_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    pub fn snapshot_memory_usage(&self) -> usize {
        self.snapshots.memory_usage()
    }

    /// Steps that happened since the last drain but were not recorded
    /// because the queue was over budget. Non-zero means the pending batch
    /// has holes; its sequence numbers show where.
    pub fn dropped_snapshots(&self) -> usize {
        self.snapshots.dropped()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Restore the red-black rules starting from a freshly linked red node
    fn fix_insert(&mut self, mut node: NodeId) {
        while Some(node) != self.root && self.parent_is_red(node) {
            let parent = self.parent(node);
            // A red root is fixed by the blackening below
            let Some(grandparent) = self.nodes[parent].parent else {
                break;
            };
            let side = self.side_in_parent(parent, grandparent);
            let uncle = self.nodes[grandparent].child(side.opposite());

            match uncle.filter(|&uncle| self.nodes[uncle].color.is_red()) {
                Some(uncle) => {
                    trace!("fix_insert: red uncle {} of {}, recoloring", uncle, node);
                    self.recolor(parent, uncle, grandparent);
                    node = grandparent;
                }
                None => {
                    if self.nodes[parent].child(side.opposite()) == Some(node) {
                        trace!("fix_insert: {} is an inner child, straightening", node);
                        node = parent;
                        self.rotate_toward(node, side);
                    }
                    trace!("fix_insert: straight line at {}, rotating grandparent", node);
                    self.rotate_and_recolor(node, side.opposite());
                }
            }
        }

        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
            self.capture(Step::RootBlackened { root });
        }
    }

    fn recolor(&mut self, parent: NodeId, uncle: NodeId, grandparent: NodeId) {
        self.nodes[parent].color = Color::Black;
        self.nodes[uncle].color = Color::Black;
        self.nodes[grandparent].color = Color::Red;
        self.capture(Step::Recolored {
            parent,
            uncle,
            grandparent,
        });
    }

    /// Straight-line case: parent black, grandparent red, then rotate the
    /// grandparent toward `direction`. One snapshot covers all three changes.
    fn rotate_and_recolor(&mut self, node: NodeId, direction: Side) {
        let parent = self.parent(node);
        let grandparent = self.parent(parent);
        self.nodes[parent].color = Color::Black;
        self.nodes[grandparent].color = Color::Red;
        self.rotate_toward(grandparent, direction);
    }

    fn rotate_toward(&mut self, node: NodeId, direction: Side) {
        match direction {
            Side::Left => self.rotate_left(node),
            Side::Right => self.rotate_right(node),
        }
    }

    /// Rotate left around `node` and record the result.
    ///
    /// Search order is preserved but the color rules may not be, so only
    /// insertion repair calls this. Panics if `node` has no right child.
    pub(crate) fn rotate_left(&mut self, node: NodeId) {
        self.rotate(node, Side::Left);
    }

    /// Mirror of [`rotate_left`](Self::rotate_left). Panics if `node` has no
    /// left child.
    pub(crate) fn rotate_right(&mut self, node: NodeId) {
        self.rotate(node, Side::Right);
    }

    /// Single rotation moving `node` down toward `direction`; its child on
    /// the opposite side takes its place. Colors are left alone.
    ///
    /// Panics if that child is missing.
    fn rotate(&mut self, node: NodeId, direction: Side) {
        let pivot = self.nodes[node]
            .child(direction.opposite())
            .unwrap_or_else(|| {
                panic!(
                    "cannot rotate {:?} around {}: no {:?} child",
                    direction,
                    node,
                    direction.opposite()
                )
            });

        let inner = self.nodes[pivot].child(direction);
        self.nodes[node].set_child(direction.opposite(), inner);
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(node);
        }

        let above = self.nodes[node].parent;
        self.nodes[pivot].parent = above;
        match above {
            None => self.root = Some(pivot),
            Some(above) => {
                let side = self.side_in_parent(node, above);
                self.nodes[above].set_child(side, Some(pivot));
            }
        }

        self.nodes[pivot].set_child(direction, Some(node));
        self.nodes[node].parent = Some(pivot);
        trace!("rotate: {} moved {:?} under {}", node, direction, pivot);

        self.capture(match direction {
            Side::Left => Step::RotatedLeft { around: node },
            Side::Right => Step::RotatedRight { around: node },
        });
    }

    fn parent(&self, node: NodeId) -> NodeId {
        self.nodes[node]
            .parent
            .unwrap_or_else(|| panic!("node {} has no parent during repair", node))
    }

    fn parent_is_red(&self, node: NodeId) -> bool {
        self.nodes[node]
            .parent
            .is_some_and(|parent| self.nodes[parent].color.is_red())
    }

    fn side_in_parent(&self, child: NodeId, parent: NodeId) -> Side {
        if self.nodes[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Record the current tree. Every step takes a sequence number, recorded
    /// or not. After the first refusal in an insertion the remaining steps
    /// of that insertion are skipped.
    fn capture(&mut self, step: Step) {
        if !self.config.record_snapshots {
            return;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if self.trace_cut {
            self.snapshots.skip();
            return;
        }

        let snapshot = Snapshot::capture(&self.nodes, self.root, step, sequence);
        if let Err(err) = self.snapshots.push(snapshot) {
            warn!("capture: {}; skipping the rest of this trace", err);
            self.trace_cut = true;
        }
    }
}

impl<K: PartialOrd> RedBlackTree<K> {
    /// Check every invariant, including parent back-links.
    /// Returns the black height on success.
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        validate::check_acyclic(self)?;

        let mut stack: Vec<(NodeId, Option<NodeId>)> =
            self.root.map(|root| (root, None)).into_iter().collect();
        while let Some((id, expected)) = stack.pop() {
            let node = &self.nodes[id];
            if node.parent != expected {
                return Err(InvariantViolation::BrokenParentLink { node: id, expected });
            }
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, Some(id)));
            }
        }

        validate::validate(self)
    }
}

impl<K: PartialOrd + Clone> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TreeView for RedBlackTree<K> {
    type Key = K;

    fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    fn key_of(&self, id: NodeId) -> &K {
        &self.nodes[id].key
    }

    fn color_of(&self, id: NodeId) -> Color {
        self.nodes[id].color
    }

    fn child_of(&self, id: NodeId, side: Side) -> Option<NodeId> {
        self.nodes[id].child(side)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
