// Snapshot capture and queueing for step-by-step replay

use crate::tree::errors::TreeError;
use crate::tree::node::{Color, NodeArena, NodeId, Side};
use crate::tree::view::TreeView;
use serde::Serialize;
use std::collections::VecDeque;
use std::mem;

/// The elementary action that produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// A new red node was linked into place, before any repair
    Inserted { node: NodeId },
    /// Red uncle case: parent and uncle turned black, grandparent red
    Recolored {
        parent: NodeId,
        uncle: NodeId,
        grandparent: NodeId,
    },
    /// `around` moved down to the left; its right child took its place
    RotatedLeft { around: NodeId },
    /// `around` moved down to the right; its left child took its place
    RotatedRight { around: NodeId },
    /// The root was forced black at the end of an insertion
    RootBlackened { root: NodeId },
}

/// A node as frozen inside a snapshot. Parent links are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotNode<K> {
    pub key: K,
    pub color: Color,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

/// Independent copy of a whole tree at one instant
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<K> {
    nodes: Vec<SnapshotNode<K>>,
    root: Option<NodeId>,
    step: Step,
    sequence: u64,
}

impl<K: Clone> Snapshot<K> {
    /// Deep-copy every node of `arena`. Ids are preserved, so a node keeps
    /// the same id in every snapshot of the same tree.
    pub(crate) fn capture(
        arena: &NodeArena<K>,
        root: Option<NodeId>,
        step: Step,
        sequence: u64,
    ) -> Self {
        let nodes = arena
            .iter()
            .map(|(_, node)| SnapshotNode {
                key: node.key.clone(),
                color: node.color,
                left: node.left,
                right: node.right,
            })
            .collect();

        Snapshot {
            nodes,
            root,
            step,
            sequence,
        }
    }
}

impl<K> Snapshot<K> {
    pub fn step(&self) -> Step {
        self.step
    }

    /// Position of this snapshot among all steps of its tree. A gap of `n`
    /// means `n` steps in between were not recorded.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn get(&self, id: NodeId) -> Option<&SnapshotNode<K>> {
        self.nodes.get(id.index())
    }

    /// Estimate the memory usage of this snapshot in bytes.
    /// Heap data owned by keys is not counted.
    pub fn estimated_size(&self) -> usize {
        mem::size_of::<Self>() + self.nodes.len() * mem::size_of::<SnapshotNode<K>>()
    }
}

impl<K> TreeView for Snapshot<K> {
    type Key = K;

    fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    fn key_of(&self, id: NodeId) -> &K {
        &self.nodes[id.index()].key
    }

    fn color_of(&self, id: NodeId) -> Color {
        self.nodes[id.index()].color
    }

    fn child_of(&self, id: NodeId, side: Side) -> Option<NodeId> {
        let node = &self.nodes[id.index()];
        match side {
            Side::Left => node.left,
            Side::Right => node.right,
        }
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Ordered queue of snapshots waiting for a consumer
#[derive(Debug)]
pub struct SnapshotQueue<K> {
    snapshots: VecDeque<Snapshot<K>>,
    max_memory: usize,
    current_memory: usize,
    dropped: usize,
}

impl<K> SnapshotQueue<K> {
    pub fn new(max_memory: usize) -> Self {
        SnapshotQueue {
            snapshots: VecDeque::new(),
            max_memory,
            current_memory: 0,
            dropped: 0,
        }
    }

    /// Append a snapshot, refusing it if the memory budget would be exceeded.
    /// A refused snapshot counts as dropped.
    pub fn push(&mut self, snapshot: Snapshot<K>) -> Result<(), TreeError> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory.saturating_add(snapshot_size) > self.max_memory {
            self.dropped += 1;
            return Err(TreeError::SnapshotLimitExceeded {
                current: self.current_memory,
                limit: self.max_memory,
            });
        }

        self.current_memory += snapshot_size;
        self.snapshots.push_back(snapshot);
        Ok(())
    }

    /// Count a step that was never captured
    pub fn skip(&mut self) {
        self.dropped += 1;
    }

    /// Take every queued snapshot in capture order and empty the queue.
    /// The dropped count starts over.
    pub fn drain(&mut self) -> Vec<Snapshot<K>> {
        self.current_memory = 0;
        self.dropped = 0;
        self.snapshots.drain(..).collect()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot<K>> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }

    /// Steps refused or skipped since the last drain
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::Node;

    fn single_node_snapshot(sequence: u64) -> Snapshot<i32> {
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::new(1, None));
        Snapshot::capture(&arena, Some(root), Step::Inserted { node: root }, sequence)
    }

    #[test]
    fn test_capture_is_independent_of_arena() {
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::new(5, None));
        let snapshot = Snapshot::capture(&arena, Some(root), Step::Inserted { node: root }, 0);

        arena[root].color = Color::Black;
        arena[root].key = 6;

        assert_eq!(snapshot.key_of(root), &5);
        assert_eq!(snapshot.color_of(root), Color::Red);
    }

    #[test]
    fn test_queue_drains_in_order() {
        let mut queue = SnapshotQueue::new(usize::MAX);
        for sequence in 0..3 {
            queue.push(single_node_snapshot(sequence)).unwrap();
        }
        assert_eq!(queue.len(), 3);
        assert!(queue.memory_usage() > 0);
        assert_eq!(queue.get(1).map(|s| s.sequence()), Some(1));
        assert!(queue.get(3).is_none());

        let drained = queue.drain();
        let order: Vec<u64> = drained.iter().map(|s| s.sequence()).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(queue.is_empty());
        assert_eq!(queue.memory_usage(), 0);
    }

    #[test]
    fn test_queue_refuses_over_limit() {
        let size = single_node_snapshot(0).estimated_size();
        let mut queue = SnapshotQueue::new(size);
        assert_eq!(queue.memory_limit(), size);

        assert!(queue.push(single_node_snapshot(0)).is_ok());
        assert_eq!(
            queue.push(single_node_snapshot(1)),
            Err(TreeError::SnapshotLimitExceeded {
                current: size,
                limit: size,
            })
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.memory_usage(), size);
        assert_eq!(queue.get(0).map(|s| s.sequence()), Some(0));
    }

    #[test]
    fn test_dropped_count_resets_on_drain() {
        let mut queue = SnapshotQueue::new(0);
        assert!(queue.push(single_node_snapshot(0)).is_err());
        queue.skip();
        queue.skip();
        assert_eq!(queue.dropped(), 3);
        assert!(queue.is_empty());

        assert!(queue.drain().is_empty());
        assert_eq!(queue.dropped(), 0);
    }
}
