//! Rune-indexed operations on [`GapBuffer`].
//!
//! Every chunk caches its rune count and the tree sums those counts per
//! subtree, so translating a rune index to a byte offset is one O(log n)
//! descent plus a scan inside a single chunk.

use crate::error::{Error, Result};
use crate::text::GapBuffer;
use crate::tree::Metric;
use crate::unicode::{byte_offset_of_rune, rune_of_byte_offset};

impl GapBuffer {
    /// Number of runes (Unicode scalar values). O(1).
    #[must_use]
    pub fn rune_length(&self) -> usize {
        self.tree.total().chars
    }

    /// Byte offset where rune `rune` starts; `rune_length()` maps to `len()`.
    #[must_use]
    pub fn rune_to_byte(&self, rune: usize) -> Option<usize> {
        let total = self.tree.total();
        if rune == total.chars {
            return Some(total.bytes);
        }
        let hit = self.tree.seek(rune, Metric::Chars)?;
        let within = byte_offset_of_rune(hit.value.text(), rune - hit.before.chars)?;
        Some(hit.before.bytes + within)
    }

    /// Index of the rune containing byte `byte`; `len()` maps to
    /// `rune_length()`.
    #[must_use]
    pub fn byte_to_rune(&self, byte: usize) -> Option<usize> {
        let total = self.tree.total();
        if byte == total.bytes {
            return Some(total.chars);
        }
        let hit = self.tree.seek(byte, Metric::Bytes)?;
        let within = rune_of_byte_offset(hit.value.text(), byte - hit.before.bytes)?;
        Some(hit.before.chars + within)
    }

    /// Insert `text` before rune `pos`.
    pub fn insert_rune_at(&mut self, pos: usize, text: &str) -> Result<()> {
        let byte = self
            .rune_to_byte(pos)
            .ok_or(Error::RunePositionOutOfRange {
                pos,
                len: self.rune_length(),
            })?;
        self.insert_at(byte, text)
    }

    /// Delete `count` runes starting at rune `pos`.
    ///
    /// A span running past the end is clamped; `count == 0` is rejected.
    pub fn delete_rune_at(&mut self, pos: usize, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidRuneRange {
                start: pos,
                end: pos,
            });
        }
        let len = self.rune_length();
        if pos >= len {
            return Err(Error::RunePositionOutOfRange { pos, len });
        }
        let (start, end) = self.rune_span(pos, pos.saturating_add(count))?;
        self.delete_at(start, end - start)
    }

    /// Text of runes `[start, end)`, with `end` clamped to the rune length.
    pub fn get_rune_text_range(&self, start: usize, end: usize) -> Result<String> {
        let (start, end) = self.rune_span(start, end)?;
        self.get_text_range(start, end)
    }

    /// Replace runes `[start, end)` with `text`, with `end` clamped to the
    /// rune length.
    pub fn replace_rune(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        let (start, end) = self.rune_span(start, end)?;
        self.replace(start, end, text)
    }

    /// Resolve a rune range to a byte range, clamping `end`.
    fn rune_span(&self, start: usize, end: usize) -> Result<(usize, usize)> {
        let invalid = Error::InvalidRuneRange { start, end };
        if start > end {
            return Err(invalid);
        }
        let clamped = end.min(self.rune_length());
        if start > clamped {
            return Err(invalid);
        }
        let byte_start = self.rune_to_byte(start).ok_or_else(|| invalid.clone())?;
        let byte_end = self.rune_to_byte(clamped).ok_or(invalid)?;
        Ok((byte_start, byte_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::GapBufferOptions;

    fn tiny() -> GapBuffer {
        GapBuffer::with_options(
            GapBufferOptions::default()
                .with_chunk_size(4)
                .with_initial_gap(8),
        )
    }

    #[test]
    fn test_rune_length_is_cached() {
        let mut buffer = tiny();
        buffer.insert_at(0, "a界b😀").unwrap();
        assert_eq!(buffer.rune_length(), 4);
        buffer.delete_rune_at(1, 1).unwrap();
        assert_eq!(buffer.rune_length(), 3);
        assert_eq!(buffer.get_text(), "ab😀");
    }

    #[test]
    fn test_rune_byte_translation_across_chunks() {
        let mut buffer = tiny();
        buffer.insert_at(0, "héllo 世界").unwrap();
        let text = buffer.get_text();
        for (rune, (byte, _)) in text.char_indices().enumerate() {
            assert_eq!(buffer.rune_to_byte(rune), Some(byte), "rune {rune}");
            assert_eq!(buffer.byte_to_rune(byte), Some(rune), "byte {byte}");
        }
        assert_eq!(buffer.rune_to_byte(8), Some(text.len()));
        assert_eq!(buffer.rune_to_byte(9), None);
        assert_eq!(buffer.byte_to_rune(text.len()), Some(8));
        assert_eq!(buffer.byte_to_rune(text.len() + 1), None);
        // Inside 'é' resolves to 'é'.
        assert_eq!(buffer.byte_to_rune(2), Some(1));
    }

    #[test]
    fn test_insert_rune_at() {
        let mut buffer = tiny();
        buffer.insert_at(0, "abc").unwrap();
        buffer.insert_rune_at(1, "界").unwrap();
        assert_eq!(buffer.get_text(), "a界bc");
        buffer.insert_rune_at(2, "!").unwrap();
        assert_eq!(buffer.get_text(), "a界!bc");
        assert_eq!(
            buffer.insert_rune_at(9, "x"),
            Err(Error::RunePositionOutOfRange { pos: 9, len: 5 })
        );
    }

    #[test]
    fn test_delete_rune_at_clamps_and_rejects() {
        let mut buffer = tiny();
        buffer.insert_at(0, "日本語です").unwrap();
        buffer.delete_rune_at(3, 100).unwrap();
        assert_eq!(buffer.get_text(), "日本語");
        assert!(matches!(
            buffer.delete_rune_at(0, 0),
            Err(Error::InvalidRuneRange { .. })
        ));
        assert!(matches!(
            buffer.delete_rune_at(3, 1),
            Err(Error::RunePositionOutOfRange { pos: 3, len: 3 })
        ));
        assert_eq!(buffer.get_text(), "日本語");
    }

    #[test]
    fn test_get_rune_text_range() {
        let mut buffer = tiny();
        buffer.insert_at(0, "Hello, 世界!").unwrap();
        assert_eq!(buffer.get_rune_text_range(7, 9).unwrap(), "世界");
        assert_eq!(buffer.get_rune_text_range(7, 50).unwrap(), "世界!");
        assert_eq!(buffer.get_rune_text_range(10, 10).unwrap(), "");
        assert!(buffer.get_rune_text_range(4, 2).is_err());
        assert!(buffer.get_rune_text_range(11, 12).is_err());
    }

    #[test]
    fn test_replace_rune() {
        let mut buffer = tiny();
        buffer.insert_at(0, "añb").unwrap();
        buffer.replace_rune(1, 2, "ñññ").unwrap();
        assert_eq!(buffer.get_text(), "añññb");
        buffer.replace_rune(4, 99, "!").unwrap();
        assert_eq!(buffer.get_text(), "añññ!");
        buffer.check_invariants().unwrap();
    }
}
