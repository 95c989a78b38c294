//! Structural invariant checks.

use super::rbtree::{Color, IndexTree, NodeId};
use super::weight::{Measure, Weight};
use std::fmt;

/// A broken red-black or aggregate invariant, naming the offending key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    RedRoot,
    RedChildOfRed { key: usize },
    BlackHeightMismatch { key: usize },
    KeyOrder { key: usize },
    ParentLink { key: usize },
    StaleWeight { key: usize },
    NodeCount { reachable: usize, stored: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => write!(f, "root is red"),
            Self::RedChildOfRed { key } => write!(f, "red node {key} has a red parent"),
            Self::BlackHeightMismatch { key } => {
                write!(f, "black heights differ below node {key}")
            }
            Self::KeyOrder { key } => write!(f, "key {key} is out of order"),
            Self::ParentLink { key } => write!(f, "node {key} has a broken parent link"),
            Self::StaleWeight { key } => write!(f, "node {key} caches a stale weight"),
            Self::NodeCount { reachable, stored } => {
                write!(f, "{reachable} nodes reachable but {stored} stored")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

struct Walk {
    reachable: usize,
    prev_key: Option<usize>,
}

impl<V: Measure> IndexTree<V> {
    /// Verify every red-black, ordering, linkage and aggregate invariant.
    ///
    /// Returns the black height on success. O(n).
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        let Some(root) = self.root else {
            return if self.nodes.is_empty() {
                Ok(0)
            } else {
                Err(InvariantViolation::NodeCount {
                    reachable: 0,
                    stored: self.nodes.len(),
                })
            };
        };
        if self.nodes[root].color == Color::Red {
            return Err(InvariantViolation::RedRoot);
        }
        if self.nodes[root].parent.is_some() {
            return Err(InvariantViolation::ParentLink {
                key: self.nodes[root].key,
            });
        }

        let mut walk = Walk {
            reachable: 0,
            prev_key: None,
        };
        let black_height = self.check_subtree(root, &mut walk)?;
        if walk.reachable != self.nodes.len() {
            return Err(InvariantViolation::NodeCount {
                reachable: walk.reachable,
                stored: self.nodes.len(),
            });
        }
        Ok(black_height)
    }

    fn check_subtree(&self, id: NodeId, walk: &mut Walk) -> Result<usize, InvariantViolation> {
        let node = &self.nodes[id];
        let key = node.key;

        for child in [node.left, node.right].into_iter().flatten() {
            if self.nodes[child].parent != Some(id) {
                return Err(InvariantViolation::ParentLink {
                    key: self.nodes[child].key,
                });
            }
            if node.color == Color::Red && self.nodes[child].color == Color::Red {
                return Err(InvariantViolation::RedChildOfRed {
                    key: self.nodes[child].key,
                });
            }
        }

        let left_height = match node.left {
            Some(left) => self.check_subtree(left, walk)?,
            None => 1,
        };

        if walk.prev_key.is_some_and(|prev| prev >= key) {
            return Err(InvariantViolation::KeyOrder { key });
        }
        walk.prev_key = Some(key);
        walk.reachable += 1;

        let right_height = match node.right {
            Some(right) => self.check_subtree(right, walk)?,
            None => 1,
        };
        if left_height != right_height {
            return Err(InvariantViolation::BlackHeightMismatch { key });
        }

        let expected: Weight =
            self.total_of(node.left) + node.value.measure() + self.total_of(node.right);
        if node.weight != node.value.measure() || node.total != expected {
            return Err(InvariantViolation::StaleWeight { key });
        }

        Ok(left_height + usize::from(node.color == Color::Black))
    }
}
