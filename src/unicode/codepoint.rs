//! Byte and rune (Unicode scalar value) offset translation.

use ropey::str_utils::{byte_to_char_idx, char_to_byte_idx};
use std::borrow::Cow;

/// Count the Unicode scalar values in `text`.
#[must_use]
pub fn count_runes(text: &str) -> usize {
    byte_to_char_idx(text, text.len())
}

/// Byte offset at which rune `rune_index` starts.
///
/// `rune_index == count_runes(text)` resolves to `text.len()`. Anything past
/// that is `None`.
#[must_use]
pub fn byte_offset_of_rune(text: &str, rune_index: usize) -> Option<usize> {
    if rune_index > count_runes(text) {
        return None;
    }
    Some(char_to_byte_idx(text, rune_index))
}

/// Byte span covering runes `[start_rune, end_rune)`.
///
/// `start_rune` must resolve; an `end_rune` past the end of `text` is
/// clamped to `text.len()`.
#[must_use]
pub fn byte_range_of_runes(
    text: &str,
    start_rune: usize,
    end_rune: usize,
) -> Option<(usize, usize)> {
    if end_rune < start_rune {
        return None;
    }
    let start = byte_offset_of_rune(text, start_rune)?;
    if start_rune == end_rune {
        return Some((start, start));
    }
    let end = start + char_to_byte_idx(&text[start..], end_rune - start_rune);
    Some((start, end))
}

/// Rune index of the scalar containing `byte_offset`.
///
/// Offsets inside a multi-byte sequence resolve to the rune they belong to.
#[must_use]
pub fn rune_of_byte_offset(text: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset > text.len() {
        return None;
    }
    Some(byte_to_char_idx(text, byte_offset))
}

/// Repair a byte sequence into valid UTF-8 by dropping invalid sequences.
///
/// Valid input is borrowed unchanged.
#[must_use]
pub fn sanitize_utf8(bytes: &[u8]) -> Cow<'_, str> {
    let mut rest = match std::str::from_utf8(bytes) {
        Ok(valid) => return Cow::Borrowed(valid),
        Err(_) => bytes,
    };

    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                if let Ok(valid) = std::str::from_utf8(valid) {
                    out.push_str(valid);
                }
                match err.error_len() {
                    Some(bad) => rest = &after[bad..],
                    // Truncated sequence at the end of input.
                    None => break,
                }
            }
        }
    }
    Cow::Owned(out)
}

/// Largest char boundary `<= index`, clamped to `text.len()`.
#[must_use]
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= index`, clamped to `text.len()`.
#[must_use]
pub fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_runes() {
        assert_eq!(count_runes(""), 0);
        assert_eq!(count_runes("abc"), 3);
        assert_eq!(count_runes("a界b"), 3);
        assert_eq!(count_runes("👍🏽"), 2);
    }

    #[test]
    fn test_byte_offset_of_rune() {
        let text = "a界bc";
        assert_eq!(byte_offset_of_rune(text, 0), Some(0));
        assert_eq!(byte_offset_of_rune(text, 1), Some(1));
        assert_eq!(byte_offset_of_rune(text, 2), Some(4));
        assert_eq!(byte_offset_of_rune(text, 4), Some(text.len()));
        assert_eq!(byte_offset_of_rune(text, 5), None);
    }

    #[test]
    fn test_byte_range_of_runes() {
        let text = "Hello, 世界!";
        assert_eq!(byte_range_of_runes(text, 7, 9), Some((7, 13)));
        assert_eq!(byte_range_of_runes(text, 3, 3), Some((3, 3)));
        // End past the text clamps.
        assert_eq!(byte_range_of_runes(text, 7, 100), Some((7, text.len())));
        assert_eq!(byte_range_of_runes(text, 5, 4), None);
        assert_eq!(byte_range_of_runes(text, 11, 12), None);
    }

    #[test]
    fn test_rune_of_byte_offset() {
        let text = "a界b";
        assert_eq!(rune_of_byte_offset(text, 0), Some(0));
        assert_eq!(rune_of_byte_offset(text, 2), Some(1));
        assert_eq!(rune_of_byte_offset(text, 4), Some(2));
        assert_eq!(rune_of_byte_offset(text, 5), Some(3));
        assert_eq!(rune_of_byte_offset(text, 6), None);
    }

    #[test]
    fn test_sanitize_valid_is_borrowed() {
        let out = sanitize_utf8("héllo".as_bytes());
        assert!(matches!(out, Cow::Borrowed("héllo")));
    }

    #[test]
    fn test_sanitize_drops_invalid_bytes() {
        assert_eq!(sanitize_utf8(b"ab\xffcd"), "abcd");
        // Lone continuation byte and a truncated three-byte sequence.
        assert_eq!(sanitize_utf8(b"\x80x\xe4\xb8"), "x");
        // Truncated sequence in the middle.
        assert_eq!(sanitize_utf8(b"a\xe4\xb8b"), "ab");
        assert_eq!(sanitize_utf8(&[]), "");
    }

    #[test]
    fn test_char_boundaries() {
        let text = "a界b";
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(floor_char_boundary(text, 4), 4);
        assert_eq!(ceil_char_boundary(text, 2), 4);
        assert_eq!(ceil_char_boundary(text, 1), 1);
        assert_eq!(floor_char_boundary(text, 99), text.len());
        assert_eq!(ceil_char_boundary(text, 99), text.len());
    }
}
