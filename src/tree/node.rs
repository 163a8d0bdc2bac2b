//! Node records and the arena that owns them
//!
//! Nodes live in a dense [`NodeArena`] and refer to each other through
//! [`NodeId`] indices. The `parent` link is a plain back-reference used only
//! while walking upward during fix-up and rotation; ownership is the arena's.
//!
//! Nodes are never removed, so an id stays valid (and names the same logical
//! node) for the whole lifetime of a tree.

use serde::Serialize;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Node color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn is_red(self) -> bool {
        matches!(self, Color::Red)
    }

    pub fn is_black(self) -> bool {
        matches!(self, Color::Black)
    }
}

/// Which child slot of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Index of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single tree vertex
#[derive(Debug, Clone)]
pub struct Node<K> {
    pub key: K,
    pub color: Color,
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl<K> Node<K> {
    /// New nodes are always red
    pub fn new(key: K, parent: Option<NodeId>) -> Self {
        Node {
            key,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// Dense storage for every node of one tree
#[derive(Debug, Clone)]
pub struct NodeArena<K> {
    nodes: Vec<Node<K>>,
}

impl<K> NodeArena<K> {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    /// Store a node and return its id
    pub fn alloc(&mut self, node: Node<K>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<K>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }
}

impl<K> Default for NodeArena<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Index<NodeId> for NodeArena<K> {
    type Output = Node<K>;

    fn index(&self, id: NodeId) -> &Node<K> {
        &self.nodes[id.0]
    }
}

impl<K> IndexMut<NodeId> for NodeArena<K> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.nodes[id.0]
    }
}
