//! Chunked gap buffer over a balanced index tree.
//!
//! Text lives in [`Chunk`]s keyed by physical offset in an [`IndexTree`].
//! Physical key space has three regions:
//!
//! ```text
//! 0            gap_start          gap_end                 gap_end + tail
//! |-- chunks --|------ gap -------|------- chunks --------|
//!   logical == physical              logical == physical - gap_len
//! ```
//!
//! Edits happen at `gap_start`. Moving the gap re-keys only the chunks it
//! passes over, and growing it re-keys only the chunks after it, so the cost
//! of both scales with chunk count rather than byte count.

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log_with};
use crate::text::chunk::{Chunk, Pieces};
use crate::tree::{IndexTree, InvariantViolation, Metric};
use crate::unicode::{ceil_char_boundary, floor_char_boundary, sanitize_utf8};
use std::fmt;

/// Default maximum chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default initial gap capacity in bytes.
pub const DEFAULT_GAP_SIZE: usize = 1024 * 1024;

/// Construction-time buffer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapBufferOptions {
    /// Maximum bytes per chunk. Zero selects [`DEFAULT_CHUNK_SIZE`].
    pub chunk_size: usize,
    /// Gap capacity reserved at construction.
    pub initial_gap: usize,
}

impl Default for GapBufferOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            initial_gap: DEFAULT_GAP_SIZE,
        }
    }
}

impl GapBufferOptions {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_initial_gap(mut self, initial_gap: usize) -> Self {
        self.initial_gap = initial_gap;
        self
    }

    fn effective_chunk_size(self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }
}

/// Position-indexed text container with a movable gap.
///
/// All positions in the byte-oriented API are logical byte offsets: the gap
/// is invisible to callers. Positions handed to mutating calls must sit on a
/// UTF-8 scalar boundary.
///
/// Not thread-safe by itself: gap moves and expansions pass through
/// intermediate states, so readers must not overlap writers.
#[derive(Clone, Debug)]
pub struct GapBuffer {
    pub(super) tree: IndexTree<Chunk>,
    gap_start: usize,
    gap_end: usize,
    length: usize,
    chunk_size: usize,
    initial_gap: usize,
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl GapBuffer {
    /// Create an empty buffer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GapBufferOptions::default())
    }

    /// Create an empty buffer.
    #[must_use]
    pub fn with_options(options: GapBufferOptions) -> Self {
        Self {
            tree: IndexTree::new(),
            gap_start: 0,
            gap_end: options.initial_gap,
            length: 0,
            chunk_size: options.effective_chunk_size(),
            initial_gap: options.initial_gap,
        }
    }

    /// Create an empty buffer with a custom chunk size.
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self::with_options(GapBufferOptions::default().with_chunk_size(chunk_size))
    }

    /// Create a buffer holding `text`.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.append(text);
        buffer
    }

    /// Logical length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Remaining gap capacity in bytes.
    #[must_use]
    pub fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// Physical offset where the gap begins.
    #[must_use]
    pub fn gap_start(&self) -> usize {
        self.gap_start
    }

    /// Physical offset one past the gap.
    #[must_use]
    pub fn gap_end(&self) -> usize {
        self.gap_end
    }

    /// Maximum bytes per chunk.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks in the tree.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.tree.len()
    }

    /// Read-only view of the backing tree.
    #[must_use]
    pub fn tree(&self) -> &IndexTree<Chunk> {
        &self.tree
    }

    /// Insert `text` at logical byte `pos`.
    pub fn insert_at(&mut self, pos: usize, text: &str) -> Result<()> {
        if pos > self.length {
            return Err(Error::PositionOutOfRange {
                pos,
                len: self.length,
            });
        }
        self.check_boundary(pos)?;
        if text.is_empty() {
            return Ok(());
        }

        self.move_gap(pos);
        self.expand_gap(text.len());
        self.fill_gap(text);
        Ok(())
    }

    /// Insert raw bytes, dropping any invalid UTF-8 sequences first.
    pub fn insert_bytes_at(&mut self, pos: usize, bytes: &[u8]) -> Result<()> {
        let text = sanitize_utf8(bytes);
        self.insert_at(pos, &text)
    }

    /// Append `text` at the end.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.move_gap(self.length);
        self.expand_gap(text.len());
        self.fill_gap(text);
    }

    /// Delete `count` bytes starting at logical byte `pos`.
    ///
    /// Chunks straddling either end of the span are split first, so exactly
    /// `count` bytes disappear whatever the chunk layout.
    pub fn delete_at(&mut self, pos: usize, count: usize) -> Result<()> {
        let end = pos
            .checked_add(count)
            .filter(|&end| end <= self.length)
            .ok_or(Error::CountOutOfRange {
                pos,
                count,
                len: self.length,
            })?;
        self.check_boundary(pos)?;
        self.check_boundary(end)?;
        if count == 0 {
            return Ok(());
        }

        self.move_gap(pos);
        self.split_at(end);

        let doomed: Vec<usize> = self
            .tree
            .range(self.gap_end..self.gap_end + count)
            .map(|(key, _)| key)
            .collect();
        for key in doomed {
            self.tree.remove(key);
        }

        self.gap_end += count;
        self.length -= count;
        Ok(())
    }

    /// Replace logical bytes `[start, end)` with `text`.
    ///
    /// Both ends are validated up front. The delete and the insert still run
    /// as two separate steps.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        if start > end || end > self.length {
            return Err(Error::InvalidRange {
                start,
                end,
                len: self.length,
            });
        }
        self.check_boundary(start)?;
        self.check_boundary(end)?;

        self.delete_at(start, end - start)?;
        self.insert_at(start, text)
    }

    /// Remove all text and reset the gap to its initial capacity.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.gap_start = 0;
        self.gap_end = self.initial_gap;
        self.length = 0;
    }

    /// Full text in logical order.
    #[must_use]
    pub fn get_text(&self) -> String {
        let mut out = String::with_capacity(self.length);
        for piece in self.chunks() {
            out.push_str(piece);
        }
        out
    }

    /// Text between logical bytes `start` and `end`.
    ///
    /// Ends that fall inside a multi-byte scalar are pulled inward to the
    /// nearest boundary, so the result is always whole scalars.
    pub fn get_text_range(&self, start: usize, end: usize) -> Result<String> {
        if start > end || end > self.length {
            return Err(Error::InvalidRange {
                start,
                end,
                len: self.length,
            });
        }

        let mut out = String::with_capacity(end - start);
        let Some(first) = self.tree.seek(start, Metric::Bytes) else {
            return Ok(out);
        };
        let physical_end = self.to_physical(end);

        for (key, chunk) in self.tree.range(first.key..physical_end) {
            if self.in_gap(key) {
                continue;
            }
            let logical = self.to_logical(key);
            if logical >= end {
                break;
            }
            let text = chunk.text();
            let lo = ceil_char_boundary(text, start.saturating_sub(logical));
            let hi = floor_char_boundary(text, (end - logical).min(text.len()));
            if lo < hi {
                out.push_str(&text[lo..hi]);
            }
        }
        Ok(out)
    }

    /// Chunk texts in logical order.
    pub fn chunks(&self) -> impl Iterator<Item = &str> + '_ {
        self.tree
            .iter()
            .filter(|&(key, _)| !self.in_gap(key))
            .map(|(_, chunk)| chunk.text())
    }

    /// Verify tree invariants and the physical layout of every chunk.
    pub fn check_invariants(&self) -> std::result::Result<(), LayoutViolation> {
        self.tree.check_invariants().map_err(LayoutViolation::Tree)?;
        if self.gap_start > self.gap_end {
            return Err(LayoutViolation::GapInverted {
                gap_start: self.gap_start,
                gap_end: self.gap_end,
            });
        }

        let mut next = 0;
        let mut total = 0;
        for (key, chunk) in self.tree.iter() {
            if next == self.gap_start {
                next = self.gap_end;
            }
            if chunk.start() != key {
                return Err(LayoutViolation::KeyMismatch {
                    key,
                    start: chunk.start(),
                });
            }
            if chunk.is_empty() {
                return Err(LayoutViolation::EmptyChunk { key });
            }
            if chunk.len() > self.chunk_size && chunk.chars() > 1 {
                return Err(LayoutViolation::OversizedChunk {
                    key,
                    len: chunk.len(),
                });
            }
            if self.in_gap(key) || (key < self.gap_start && key + chunk.len() > self.gap_start)
            {
                return Err(LayoutViolation::ChunkInGap { key });
            }
            if key != next {
                return Err(LayoutViolation::Discontiguous {
                    key,
                    expected: next,
                });
            }
            next = key + chunk.len();
            total += chunk.len();
        }

        if total != self.length || self.tree.total().bytes != self.length {
            return Err(LayoutViolation::LengthMismatch {
                cached: self.length,
                actual: total,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Gap management
    // ------------------------------------------------------------------

    fn in_gap(&self, key: usize) -> bool {
        key >= self.gap_start && key < self.gap_end
    }

    fn to_physical(&self, logical: usize) -> usize {
        if logical >= self.gap_start {
            logical + self.gap_len()
        } else {
            logical
        }
    }

    fn to_logical(&self, key: usize) -> usize {
        if key >= self.gap_end {
            key - self.gap_len()
        } else {
            key
        }
    }

    fn check_boundary(&self, pos: usize) -> Result<()> {
        match self.tree.seek(pos, Metric::Bytes) {
            Some(hit) if !hit.value.text().is_char_boundary(pos - hit.before.bytes) => {
                Err(Error::NotCharBoundary { pos })
            }
            _ => Ok(()),
        }
    }

    /// Make logical `pos` a chunk boundary, splitting the chunk that spans it.
    fn split_at(&mut self, pos: usize) {
        let Some(hit) = self.tree.seek(pos, Metric::Bytes) else {
            return;
        };
        let offset = pos - hit.before.bytes;
        if offset == 0 {
            return;
        }
        let key = hit.key;
        let (head, tail) = hit.value.split_at(offset);
        self.tree.update(key, head);
        self.tree.insert(tail.start(), tail);
    }

    fn shift_chunk(&mut self, from: usize, to: usize) {
        if let Some(chunk) = self.tree.remove(from) {
            self.tree.insert(to, chunk.relocated(to));
        }
    }

    /// Relocate the gap so it starts at logical `pos`.
    fn move_gap(&mut self, pos: usize) {
        if pos == self.gap_start {
            return;
        }
        self.split_at(pos);

        let gap = self.gap_len();
        let old_start = self.gap_start;
        let moved = if pos < self.gap_start {
            let keys: Vec<usize> = self
                .tree
                .range(pos..self.gap_start)
                .map(|(key, _)| key)
                .collect();
            // Rightmost first: each new key lands past every key still to move.
            for &key in keys.iter().rev() {
                self.shift_chunk(key, key + gap);
            }
            keys.len()
        } else {
            let distance = pos - self.gap_start;
            let keys: Vec<usize> = self
                .tree
                .range(self.gap_end..self.gap_end + distance)
                .map(|(key, _)| key)
                .collect();
            for &key in &keys {
                self.shift_chunk(key, key - gap);
            }
            keys.len()
        };
        self.gap_start = pos;
        self.gap_end = pos + gap;

        emit_log_with(LogLevel::Debug, || {
            format!("gap moved {old_start} -> {pos}, {moved} chunks re-keyed")
        });
    }

    /// Grow the gap to at least `min_size` bytes, doubling when that is larger.
    fn expand_gap(&mut self, min_size: usize) {
        let current = self.gap_len();
        if current >= min_size {
            return;
        }
        let target = current.saturating_mul(2).max(min_size);
        let delta = target - current;

        let keys: Vec<usize> = self
            .tree
            .range(self.gap_end..)
            .map(|(key, _)| key)
            .collect();
        for &key in keys.iter().rev() {
            self.shift_chunk(key, key + delta);
        }
        self.gap_end += delta;

        emit_log_with(LogLevel::Debug, || {
            format!(
                "gap expanded {current} -> {target} bytes, {} chunks shifted",
                keys.len()
            )
        });
    }

    /// Write `text` into the gap as chunk-sized pieces. The gap must already
    /// sit at the insertion point with enough room.
    fn fill_gap(&mut self, text: &str) {
        for piece in Pieces::new(text, self.chunk_size) {
            let start = self.gap_start;
            let replaced = self.tree.insert(start, Chunk::new(start, piece));
            debug_assert!(replaced.is_none(), "chunk key {start} already taken");
            self.gap_start += piece.len();
        }
        self.length += text.len();
    }
}

impl fmt::Display for GapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in self.chunks() {
            f.write_str(piece)?;
        }
        Ok(())
    }
}

impl From<&str> for GapBuffer {
    fn from(text: &str) -> Self {
        Self::with_text(text)
    }
}

/// A broken physical-layout invariant in a [`GapBuffer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutViolation {
    Tree(InvariantViolation),
    GapInverted { gap_start: usize, gap_end: usize },
    KeyMismatch { key: usize, start: usize },
    EmptyChunk { key: usize },
    OversizedChunk { key: usize, len: usize },
    ChunkInGap { key: usize },
    Discontiguous { key: usize, expected: usize },
    LengthMismatch { cached: usize, actual: usize },
}

impl fmt::Display for LayoutViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(violation) => write!(f, "tree: {violation}"),
            Self::GapInverted { gap_start, gap_end } => {
                write!(f, "gap start {gap_start} is past gap end {gap_end}")
            }
            Self::KeyMismatch { key, start } => {
                write!(f, "chunk keyed {key} records start {start}")
            }
            Self::EmptyChunk { key } => write!(f, "empty chunk at {key}"),
            Self::OversizedChunk { key, len } => {
                write!(f, "chunk at {key} holds {len} bytes, over the chunk size")
            }
            Self::ChunkInGap { key } => write!(f, "chunk at {key} overlaps the gap"),
            Self::Discontiguous { key, expected } => {
                write!(f, "chunk at {key}, expected one at {expected}")
            }
            Self::LengthMismatch { cached, actual } => {
                write!(f, "cached length {cached} but chunks hold {actual} bytes")
            }
        }
    }
}

impl std::error::Error for LayoutViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(violation) => Some(violation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(chunk_size: usize, gap: usize) -> GapBuffer {
        GapBuffer::with_options(
            GapBufferOptions::default()
                .with_chunk_size(chunk_size)
                .with_initial_gap(gap),
        )
    }

    fn keys(buffer: &GapBuffer) -> Vec<usize> {
        buffer.tree.iter().map(|(key, _)| key).collect()
    }

    #[test]
    fn test_new_buffer_state() {
        let buffer = GapBuffer::new();
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.gap_start(), 0);
        assert_eq!(buffer.gap_end(), DEFAULT_GAP_SIZE);
        assert_eq!(buffer.gap_len(), DEFAULT_GAP_SIZE);
        assert_eq!(buffer.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(buffer.get_text(), "");
    }

    #[test]
    fn test_zero_chunk_size_falls_back() {
        let buffer = GapBuffer::with_chunk_size(0);
        assert_eq!(buffer.chunk_size(), DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_insert_advances_gap_start() {
        let mut buffer = small(4, 64);
        buffer.insert_at(0, "abcdefghij").unwrap();
        assert_eq!(buffer.gap_start(), 10);
        assert_eq!(buffer.gap_end(), 64);
        assert_eq!(keys(&buffer), vec![0, 4, 8]);
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_move_gap_left_rekeys_by_gap_width() {
        let mut buffer = small(4, 64);
        buffer.insert_at(0, "abcdefgh").unwrap();
        buffer.insert_at(4, "XY").unwrap();
        assert_eq!(buffer.get_text(), "abcdXYefgh");
        assert_eq!(buffer.gap_start(), 6);
        assert_eq!(buffer.gap_end(), 60);
        // "efgh" sits right after the gap.
        assert_eq!(keys(&buffer), vec![0, 4, 60]);
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_move_gap_right_pulls_chunks_back() {
        let mut buffer = small(4, 64);
        buffer.insert_at(0, "abcdefgh").unwrap();
        buffer.insert_at(0, "_").unwrap();
        assert_eq!(buffer.gap_start(), 1);
        buffer.insert_at(9, "!").unwrap();
        assert_eq!(buffer.get_text(), "_abcdefgh!");
        assert_eq!(buffer.gap_start(), 10);
        assert_eq!(keys(&buffer), vec![0, 1, 5, 9]);
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_mid_chunk_splits_it() {
        let mut buffer = small(8, 64);
        buffer.insert_at(0, "abcdef").unwrap();
        assert_eq!(buffer.chunk_count(), 1);
        buffer.insert_at(3, "-").unwrap();
        assert_eq!(buffer.get_text(), "abc-def");
        assert_eq!(buffer.chunk_count(), 3);
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_expand_gap_doubles() {
        let mut buffer = small(4, 4);
        buffer.insert_at(0, "abcd").unwrap();
        assert_eq!(buffer.gap_len(), 0);
        buffer.insert_at(0, "xy").unwrap();
        // Empty gap: max(2 * 0, 2).
        assert_eq!(buffer.gap_len(), 0);
        buffer.insert_at(0, "z").unwrap();
        assert_eq!(buffer.get_text(), "zxyabcd");
        buffer.check_invariants().unwrap();

        let mut buffer = small(4, 8);
        buffer.insert_at(0, "abcdef").unwrap();
        buffer.insert_at(0, "0123").unwrap();
        // 2 bytes left, need 4: grows to max(4, 4) then fills.
        assert_eq!(buffer.gap_len(), 0);
        buffer.insert_at(0, "!").unwrap();
        assert_eq!(buffer.get_text(), "!0123abcdef");
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_expand_gap_prefers_double() {
        let mut buffer = small(16, 10);
        buffer.insert_at(0, "abcdefgh").unwrap();
        buffer.insert_at(8, "0123").unwrap();
        // 2 left, need 4: max(2 * 2, 4) = 4, then 4 are used.
        assert_eq!(buffer.gap_len(), 0);
        buffer.insert_at(12, "xyz").unwrap();
        // max(0, 3) = 3.
        assert_eq!(buffer.gap_len(), 0);
        assert_eq!(buffer.get_text(), "abcdefgh0123xyz");
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_zero_initial_gap() {
        let mut buffer = small(4, 0);
        buffer.insert_at(0, "hello").unwrap();
        buffer.insert_at(2, "--").unwrap();
        assert_eq!(buffer.get_text(), "he--llo");
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_splits_straddling_chunks() {
        let mut buffer = small(4, 64);
        buffer.insert_at(0, "abcdefghijkl").unwrap();
        assert_eq!(keys(&buffer), vec![0, 4, 8]);
        buffer.delete_at(2, 7).unwrap();
        assert_eq!(buffer.get_text(), "abjkl");
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.gap_start(), 2);
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_extends_gap_end() {
        let mut buffer = small(4, 64);
        buffer.insert_at(0, "abcdefgh").unwrap();
        let before = buffer.gap_len();
        buffer.delete_at(8, 0).unwrap();
        buffer.delete_at(0, 4).unwrap();
        assert_eq!(buffer.gap_len(), before + 4);
        assert_eq!(buffer.get_text(), "efgh");
    }

    #[test]
    fn test_clear_resets_gap() {
        let mut buffer = small(4, 16);
        buffer.insert_at(0, "some text that overflows").unwrap();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.chunk_count(), 0);
        assert_eq!(buffer.gap_start(), 0);
        assert_eq!(buffer.gap_end(), 16);
        buffer.check_invariants().unwrap();
    }

    #[test]
    fn test_display_matches_get_text() {
        let mut buffer = small(3, 8);
        buffer.insert_at(0, "Hello, 世界!").unwrap();
        buffer.insert_at(5, " there").unwrap();
        assert_eq!(buffer.to_string(), buffer.get_text());
    }

    #[test]
    fn test_layout_violation_display() {
        let err = LayoutViolation::Discontiguous {
            key: 9,
            expected: 4,
        };
        assert!(err.to_string().contains("expected one at 4"));
        let err = LayoutViolation::Tree(InvariantViolation::RedRoot);
        assert!(std::error::Error::source(&err).is_some());
    }
}
