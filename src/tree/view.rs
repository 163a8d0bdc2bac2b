//! Read-only structural access shared by the live tree and its snapshots
//!
//! Consumers walk trees top-down through [`NodeRef`] handles. Parent links are
//! deliberately absent from this view. Every traversal here keeps an explicit
//! stack so that a degenerate shape cannot exhaust the call stack.

use super::node::{Color, NodeId, Side};

/// Read-only access to a tree's shape, keys and colors
pub trait TreeView {
    type Key;

    fn root_id(&self) -> Option<NodeId>;

    /// Key stored at `id`. Panics if `id` does not belong to this tree.
    fn key_of(&self, id: NodeId) -> &Self::Key;

    fn color_of(&self, id: NodeId) -> Color;

    fn child_of(&self, id: NodeId, side: Side) -> Option<NodeId>;

    /// Number of nodes stored in the tree
    fn node_count(&self) -> usize;

    fn root(&self) -> Option<NodeRef<'_, Self>>
    where
        Self: Sized,
    {
        self.root_id().map(|id| NodeRef { view: self, id })
    }

    fn node(&self, id: NodeId) -> NodeRef<'_, Self>
    where
        Self: Sized,
    {
        NodeRef { view: self, id }
    }

    /// Nodes in ascending key order
    fn in_order(&self) -> InOrder<'_, Self>
    where
        Self: Sized,
    {
        let mut iter = InOrder {
            view: self,
            stack: Vec::new(),
        };
        iter.push_all_left(self.root_id());
        iter
    }

    /// Keys in ascending order
    fn keys(&self) -> impl Iterator<Item = &Self::Key>
    where
        Self: Sized,
    {
        self.in_order().map(|node| node.key())
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty)
    fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> =
            self.root_id().map(|id| (id, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for side in [Side::Left, Side::Right] {
                if let Some(child) = self.child_of(id, side) {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }
}

/// Handle to one node of a [`TreeView`]
pub struct NodeRef<'a, V> {
    view: &'a V,
    id: NodeId,
}

impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<'a, V: TreeView> NodeRef<'a, V> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> &'a V::Key {
        self.view.key_of(self.id)
    }

    pub fn color(&self) -> Color {
        self.view.color_of(self.id)
    }

    pub fn is_red(&self) -> bool {
        self.color().is_red()
    }

    pub fn child(&self, side: Side) -> Option<NodeRef<'a, V>> {
        self.view.child_of(self.id, side).map(|id| NodeRef {
            view: self.view,
            id,
        })
    }

    pub fn left(&self) -> Option<NodeRef<'a, V>> {
        self.child(Side::Left)
    }

    pub fn right(&self) -> Option<NodeRef<'a, V>> {
        self.child(Side::Right)
    }
}

impl<V: TreeView> std::fmt::Debug for NodeRef<'_, V>
where
    V::Key: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("key", self.key())
            .field("color", &self.color())
            .finish()
    }
}

/// In-order traversal over a [`TreeView`]
pub struct InOrder<'a, V> {
    view: &'a V,
    stack: Vec<NodeId>,
}

impl<V: TreeView> InOrder<'_, V> {
    fn push_all_left(&mut self, mut cursor: Option<NodeId>) {
        while let Some(id) = cursor {
            self.stack.push(id);
            cursor = self.view.child_of(id, Side::Left);
        }
    }
}

impl<'a, V: TreeView> Iterator for InOrder<'a, V> {
    type Item = NodeRef<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.push_all_left(self.view.child_of(id, Side::Right));
        Some(NodeRef {
            view: self.view,
            id,
        })
    }
}
