//! Invariant checks for anything that implements [`TreeView`]
//!
//! [`check_order`] verifies only the search-order rule and holds for every
//! snapshot, including those captured in the middle of a repair.
//! [`validate`] additionally checks the red-black color rules, which are only
//! guaranteed once a top-level insertion has returned.

use super::errors::InvariantViolation;
use super::node::{NodeId, Side};
use super::view::TreeView;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

/// Verify that no node is reachable twice from the root
pub fn check_acyclic<V: TreeView>(view: &V) -> Result<(), InvariantViolation> {
    let mut seen = FxHashSet::default();
    let mut stack: Vec<NodeId> = view.root_id().into_iter().collect();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            return Err(InvariantViolation::Revisited { node: id });
        }
        for side in [Side::Left, Side::Right] {
            if let Some(child) = view.child_of(id, side) {
                stack.push(child);
            }
        }
    }
    Ok(())
}

/// Verify the search-order rule: in-order keys are strictly increasing
pub fn check_order<V>(view: &V) -> Result<(), InvariantViolation>
where
    V: TreeView,
    V::Key: PartialOrd,
{
    check_acyclic(view)?;

    let mut previous = None;
    for node in view.in_order() {
        if let Some(prev) = previous {
            let prev_key = view.key_of(prev);
            if prev_key.partial_cmp(node.key()) != Some(Ordering::Less) {
                return Err(InvariantViolation::OutOfOrder {
                    node: node.id(),
                    previous: prev,
                });
            }
        }
        previous = Some(node.id());
    }
    Ok(())
}

/// Verify every invariant of a settled red-black tree.
///
/// Returns the black height of the tree: the number of black nodes on any
/// path from the root down to an empty position, root included.
pub fn validate<V>(view: &V) -> Result<usize, InvariantViolation>
where
    V: TreeView,
    V::Key: PartialOrd,
{
    check_order(view)?;

    let root = match view.root_id() {
        Some(root) => root,
        None => return Ok(0),
    };
    if view.color_of(root).is_red() {
        return Err(InvariantViolation::RedRoot { root });
    }

    // Post-order walk; a node is finished once both children have heights.
    let mut heights: FxHashMap<NodeId, usize> = FxHashMap::default();
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if !expanded {
            stack.push((id, true));
            for side in [Side::Left, Side::Right] {
                if let Some(child) = view.child_of(id, side) {
                    stack.push((child, false));
                }
            }
            continue;
        }

        let color = view.color_of(id);
        let mut below = [0usize; 2];
        for (slot, side) in [Side::Left, Side::Right].into_iter().enumerate() {
            if let Some(child) = view.child_of(id, side) {
                if color.is_red() && view.color_of(child).is_red() {
                    return Err(InvariantViolation::RedRedEdge { parent: id, child });
                }
                below[slot] = heights.remove(&child).unwrap_or(0);
            }
        }
        if below[0] != below[1] {
            return Err(InvariantViolation::BlackHeightMismatch {
                node: id,
                left: below[0],
                right: below[1],
            });
        }
        heights.insert(id, below[0] + usize::from(color.is_black()));
    }

    Ok(heights.remove(&root).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::{Color, Node, NodeArena};

    /// Hand-built tree for exercising the checker on broken shapes
    struct Fixture {
        nodes: NodeArena<i32>,
        root: Option<NodeId>,
    }

    impl TreeView for Fixture {
        type Key = i32;

        fn root_id(&self) -> Option<NodeId> {
            self.root
        }

        fn key_of(&self, id: NodeId) -> &i32 {
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

    fn fixture(
        root: (i32, Color),
        left: Option<(i32, Color)>,
        right: Option<(i32, Color)>,
    ) -> Fixture {
        let mut nodes = NodeArena::new();
        let mut top = Node::new(root.0, None);
        top.color = root.1;
        let top = nodes.alloc(top);
        for (side, child) in [(Side::Left, left), (Side::Right, right)] {
            if let Some((key, color)) = child {
                let mut node = Node::new(key, Some(top));
                node.color = color;
                let id = nodes.alloc(node);
                nodes[top].set_child(side, Some(id));
            }
        }
        Fixture {
            nodes,
            root: Some(top),
        }
    }

    #[test]
    fn test_valid_three_node_tree() {
        let tree = fixture(
            (20, Color::Black),
            Some((10, Color::Red)),
            Some((30, Color::Red)),
        );
        assert_eq!(validate(&tree), Ok(1));
    }

    #[test]
    fn test_empty_tree_is_valid() {
        let tree = Fixture {
            nodes: NodeArena::new(),
            root: None,
        };
        assert_eq!(validate(&tree), Ok(0));
    }

    #[test]
    fn test_detects_red_root() {
        let tree = fixture((20, Color::Red), None, None);
        assert!(matches!(
            validate(&tree),
            Err(InvariantViolation::RedRoot { .. })
        ));
    }

    #[test]
    fn test_detects_out_of_order() {
        let tree = fixture((20, Color::Black), Some((25, Color::Red)), None);
        assert!(matches!(
            check_order(&tree),
            Err(InvariantViolation::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_detects_black_height_mismatch() {
        let tree = fixture((20, Color::Black), Some((10, Color::Black)), None);
        assert!(matches!(
            validate(&tree),
            Err(InvariantViolation::BlackHeightMismatch { left: 1, right: 0, .. })
        ));
    }

    #[test]
    fn test_detects_red_red_edge() {
        let mut tree = fixture((20, Color::Black), Some((10, Color::Red)), None);
        let red = tree.nodes[tree.root.unwrap()].left.unwrap();
        let mut grandchild = Node::new(5, Some(red));
        grandchild.color = Color::Red;
        let id = tree.nodes.alloc(grandchild);
        tree.nodes[red].left = Some(id);

        assert!(matches!(
            validate(&tree),
            Err(InvariantViolation::RedRedEdge { .. })
        ));
    }

    #[test]
    fn test_detects_revisited_node() {
        let mut tree = fixture((20, Color::Black), Some((10, Color::Red)), None);
        let root = tree.root.unwrap();
        let left = tree.nodes[root].left;
        tree.nodes[root].right = left;

        assert_eq!(
            check_acyclic(&tree),
            Err(InvariantViolation::Revisited {
                node: left.unwrap()
            })
        );
    }
}
