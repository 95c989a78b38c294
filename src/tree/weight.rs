//! Subtree aggregates cached on every tree node.

use crate::unicode::count_runes;
use std::ops::{Add, AddAssign};

/// Byte and rune totals for a payload or a whole subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Weight {
    pub bytes: usize,
    pub chars: usize,
}

impl Weight {
    pub const ZERO: Self = Self { bytes: 0, chars: 0 };

    #[must_use]
    pub const fn new(bytes: usize, chars: usize) -> Self {
        Self { bytes, chars }
    }

    /// Weight of a string slice.
    #[must_use]
    pub fn of_str(text: &str) -> Self {
        Self {
            bytes: text.len(),
            chars: count_runes(text),
        }
    }

    /// Read one dimension.
    #[must_use]
    pub const fn get(self, metric: Metric) -> usize {
        match metric {
            Metric::Bytes => self.bytes,
            Metric::Chars => self.chars,
        }
    }
}

impl Add for Weight {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            bytes: self.bytes + rhs.bytes,
            chars: self.chars + rhs.chars,
        }
    }
}

impl AddAssign for Weight {
    fn add_assign(&mut self, rhs: Self) {
        self.bytes += rhs.bytes;
        self.chars += rhs.chars;
    }
}

/// Which dimension of a [`Weight`] a seek walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Bytes,
    Chars,
}

/// Payloads stored in an [`IndexTree`](super::IndexTree) report their weight.
///
/// The weight of a payload must not change while it is in the tree; replace
/// it through `insert` or `update` instead.
pub trait Measure {
    fn measure(&self) -> Weight;
}

impl Measure for String {
    fn measure(&self) -> Weight {
        Weight::of_str(self)
    }
}

impl Measure for &str {
    fn measure(&self) -> Weight {
        Weight::of_str(self)
    }
}

impl Measure for () {
    fn measure(&self) -> Weight {
        Weight::ZERO
    }
}
