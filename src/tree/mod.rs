//! Balanced index tree keyed by physical byte offset.
//!
//! [`IndexTree`] is a red-black tree over `usize` keys whose nodes also
//! cache subtree [`Weight`]s (bytes and runes). The gap buffer uses the keys
//! for physical placement and the weights for logical offset lookups.
//!
//! ```
//! use gaptree::tree::{IndexTree, Metric};
//!
//! let mut tree = IndexTree::new();
//! tree.insert(0, "Hello, ".to_string());
//! tree.insert(64, "世界".to_string());
//!
//! assert_eq!(tree.total().chars, 9);
//! let hit = tree.seek(8, Metric::Chars).unwrap();
//! assert_eq!(hit.key, 64);
//! ```

mod iter;
mod rbtree;
mod validate;
mod weight;

pub use iter::Iter;
pub use rbtree::{IndexTree, Seek};
pub use validate::InvariantViolation;
pub use weight::{Measure, Metric, Weight};
