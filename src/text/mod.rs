//! Chunked gap buffer text storage.
//!
//! This module provides [`GapBuffer`], which keeps text as bounded
//! [`Chunk`]s in a red-black [`IndexTree`](crate::tree::IndexTree) and
//! reserves a movable gap of physical offsets where edits land.
//!
//! Key types:
//!
//! - [`GapBuffer`]: byte- and rune-indexed insert, delete, replace and range reads
//! - [`GapBufferOptions`]: chunk size and initial gap capacity
//! - [`Chunk`]: one immutable, scalar-aligned piece of text
//!
//! # Examples
//!
//! ## Byte offsets
//!
//! ```
//! use gaptree::GapBuffer;
//!
//! let mut buffer = GapBuffer::new();
//! buffer.insert_at(0, "abcdef").unwrap();
//! buffer.replace(0, 3, "xyz").unwrap();
//! assert_eq!(buffer.get_text(), "xyzdef");
//! assert_eq!(buffer.get_text_range(1, 4).unwrap(), "yzd");
//! ```
//!
//! ## Rune offsets
//!
//! ```
//! use gaptree::GapBuffer;
//!
//! let mut buffer = GapBuffer::with_text("abc");
//! buffer.insert_rune_at(1, "界").unwrap();
//! assert_eq!(buffer.get_text(), "a界bc");
//! assert_eq!(buffer.rune_length(), 4);
//! assert_eq!(buffer.len(), 6);
//! ```

mod chunk;
mod gap_buffer;
mod runes;

pub use chunk::Chunk;
pub use gap_buffer::{
    DEFAULT_CHUNK_SIZE, DEFAULT_GAP_SIZE, GapBuffer, GapBufferOptions, LayoutViolation,
};
