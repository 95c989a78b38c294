//! Error types for gaptree.

use std::fmt;

/// Result type alias for gaptree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for buffer operations.
///
/// Every variant is a range error: the caller asked for a position or span
/// that the current content cannot satisfy. Validation happens before any
/// mutation, so a returned error means the buffer is unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Byte position past the end of the text.
    PositionOutOfRange { pos: usize, len: usize },
    /// Deletion span running past the end of the text.
    CountOutOfRange { pos: usize, count: usize, len: usize },
    /// Malformed `[start, end)` byte range.
    InvalidRange { start: usize, end: usize, len: usize },
    /// Rune position that does not resolve to a byte offset.
    RunePositionOutOfRange { pos: usize, len: usize },
    /// Malformed or unresolvable rune range.
    InvalidRuneRange { start: usize, end: usize },
    /// Byte position inside a multi-byte UTF-8 sequence.
    NotCharBoundary { pos: usize },
}

impl Error {
    /// All variants belong to the range-error family.
    #[must_use]
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Self::PositionOutOfRange { .. }
                | Self::CountOutOfRange { .. }
                | Self::InvalidRange { .. }
                | Self::RunePositionOutOfRange { .. }
                | Self::InvalidRuneRange { .. }
                | Self::NotCharBoundary { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositionOutOfRange { pos, len } => {
                write!(f, "position out of range: {pos} (length {len})")
            }
            Self::CountOutOfRange { pos, count, len } => {
                write!(
                    f,
                    "position or count out of range: {pos}+{count} (length {len})"
                )
            }
            Self::InvalidRange { start, end, len } => {
                write!(f, "invalid range: {start}..{end} (length {len})")
            }
            Self::RunePositionOutOfRange { pos, len } => {
                write!(f, "rune position out of range: {pos} (rune length {len})")
            }
            Self::InvalidRuneRange { start, end } => {
                write!(f, "invalid rune range: {start}..{end}")
            }
            Self::NotCharBoundary { pos } => {
                write!(f, "position {pos} is not on a UTF-8 character boundary")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PositionOutOfRange { pos: 7, len: 3 };
        assert!(err.to_string().starts_with("position out of range"));
        assert!(err.to_string().contains("length 3"));

        let err = Error::CountOutOfRange {
            pos: 2,
            count: 5,
            len: 4,
        };
        assert!(err.to_string().starts_with("position or count out of range"));
        assert!(err.to_string().contains("2+5"));

        let err = Error::InvalidRange {
            start: 4,
            end: 2,
            len: 10,
        };
        assert!(err.to_string().starts_with("invalid range"));

        let err = Error::RunePositionOutOfRange { pos: 9, len: 4 };
        assert!(err.to_string().starts_with("rune position out of range"));

        let err = Error::InvalidRuneRange { start: 3, end: 1 };
        assert!(err.to_string().starts_with("invalid rune range"));

        let err = Error::NotCharBoundary { pos: 2 };
        assert!(err.to_string().contains("character boundary"));
    }

    #[test]
    fn test_range_error_family() {
        assert!(Error::NotCharBoundary { pos: 1 }.is_range_error());
        assert!(Error::InvalidRuneRange { start: 0, end: 0 }.is_range_error());
    }

    #[test]
    fn test_error_trait_object() {
        let err: Box<dyn std::error::Error> = Box::new(Error::PositionOutOfRange { pos: 1, len: 0 });
        assert!(err.source().is_none());
    }
}
