//! Immutable text chunks stored as tree payloads.

use crate::tree::{Measure, Weight};
use crate::unicode::{ceil_char_boundary, count_runes, floor_char_boundary};

/// A bounded run of text starting at a physical offset.
///
/// The text is a `str`, so a chunk always begins and ends on a scalar
/// boundary. `start` mirrors the chunk's tree key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    start: usize,
    text: Box<str>,
    chars: usize,
}

impl Chunk {
    /// Create a chunk at physical offset `start`.
    #[must_use]
    pub fn new(start: usize, text: &str) -> Self {
        Self {
            start,
            text: text.into(),
            chars: count_runes(text),
        }
    }

    /// Physical offset of the first byte.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Chunk contents.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of runes.
    #[must_use]
    pub fn chars(&self) -> usize {
        self.chars
    }

    /// The same text re-keyed at `start`.
    #[must_use]
    pub(crate) fn relocated(self, start: usize) -> Self {
        Self { start, ..self }
    }

    /// Split at byte `offset`, which must be a char boundary strictly inside
    /// the chunk. The tail starts at `start + offset`.
    #[must_use]
    pub(crate) fn split_at(&self, offset: usize) -> (Self, Self) {
        let (head, tail) = self.text.split_at(offset);
        (Self::new(self.start, head), Self::new(self.start + offset, tail))
    }
}

impl Measure for Chunk {
    fn measure(&self) -> Weight {
        Weight::new(self.text.len(), self.chars)
    }
}

/// Iterator cutting text into pieces of at most `max` bytes.
///
/// Each cut is moved back to the nearest scalar boundary. A scalar longer
/// than `max` becomes a piece of its own.
pub(crate) struct Pieces<'a> {
    rest: &'a str,
    max: usize,
}

impl<'a> Pieces<'a> {
    pub(crate) fn new(text: &'a str, max: usize) -> Self {
        Self {
            rest: text,
            max: max.max(1),
        }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let mut end = self.rest.len();
        if end > self.max {
            end = floor_char_boundary(self.rest, self.max);
            if end == 0 {
                end = ceil_char_boundary(self.rest, 1);
            }
        }
        let (piece, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_accessors() {
        let chunk = Chunk::new(10, "a界");
        assert_eq!(chunk.start(), 10);
        assert_eq!(chunk.len(), 4);
        assert_eq!(chunk.chars(), 2);
        assert_eq!(chunk.measure(), Weight::new(4, 2));
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_chunk_split_and_relocate() {
        let chunk = Chunk::new(100, "ab界cd");
        let (head, tail) = chunk.split_at(5);
        assert_eq!(head.text(), "ab界");
        assert_eq!(head.start(), 100);
        assert_eq!(tail.text(), "cd");
        assert_eq!(tail.start(), 105);
        assert_eq!(tail.chars(), 2);

        let moved = head.relocated(7);
        assert_eq!(moved.start(), 7);
        assert_eq!(moved.text(), "ab界");
    }

    #[test]
    fn test_pieces_ascii() {
        let pieces: Vec<&str> = Pieces::new("abcdefg", 3).collect();
        assert_eq!(pieces, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_pieces_never_split_scalars() {
        // 界 is three bytes; a cut at 4 would land inside the second one.
        let pieces: Vec<&str> = Pieces::new("界界界", 4).collect();
        assert_eq!(pieces, vec!["界", "界", "界"]);
    }

    #[test]
    fn test_pieces_scalar_wider_than_limit() {
        let pieces: Vec<&str> = Pieces::new("a😀b", 2).collect();
        assert_eq!(pieces, vec!["a", "😀", "b"]);
    }

    #[test]
    fn test_pieces_empty() {
        assert_eq!(Pieces::new("", 8).count(), 0);
    }
}
