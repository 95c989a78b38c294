//! Unicode utilities for rune offsets and UTF-8 repair.

mod codepoint;

pub use codepoint::{
    byte_offset_of_rune, byte_range_of_runes, ceil_char_boundary, count_runes,
    floor_char_boundary, rune_of_byte_offset, sanitize_utf8,
};
