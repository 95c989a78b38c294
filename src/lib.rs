//! `gaptree` - Chunked gap buffer over a red-black index tree
//!
//! Storage core for text editors: text is held as bounded, UTF-8-aligned
//! chunks in a balanced tree keyed by physical offset, with a movable gap
//! that absorbs localized edits without shifting distant data.

// Crate-level lint configuration
#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)] // Every error is a range error, documented on Error
#![allow(clippy::missing_panics_doc)] // Panics only in tests
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod error;
pub mod event;
pub mod text;
pub mod tree;
pub mod unicode;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use event::{LogLevel, clear_log_callback, emit_log, log_enabled, set_log_callback};
pub use text::{Chunk, GapBuffer, GapBufferOptions, LayoutViolation};
pub use tree::{IndexTree, InvariantViolation, Measure, Metric, Weight};
