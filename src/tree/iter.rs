//! In-order iteration.

use super::rbtree::{IndexTree, NodeId};
use super::weight::Measure;
use std::ops::Bound;

/// Ascending `(key, payload)` iterator, optionally stopping at an end bound.
pub struct Iter<'a, V> {
    tree: &'a IndexTree<V>,
    next: Option<NodeId>,
    end: Bound<usize>,
}

impl<'a, V: Measure> Iter<'a, V> {
    pub(super) fn new(tree: &'a IndexTree<V>, start: Option<NodeId>, end: Bound<usize>) -> Self {
        Self {
            tree,
            next: start,
            end,
        }
    }
}

impl<'a, V: Measure> Iterator for Iter<'a, V> {
    type Item = (usize, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.tree.nodes[id];
        let in_range = match self.end {
            Bound::Included(end) => node.key <= end,
            Bound::Excluded(end) => node.key < end,
            Bound::Unbounded => true,
        };
        if !in_range {
            self.next = None;
            return None;
        }
        self.next = self.tree.successor(id);
        Some((node.key, &node.value))
    }
}
