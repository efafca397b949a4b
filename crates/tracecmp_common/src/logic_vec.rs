//! Packed bit-strings of four-state logic levels.

use crate::logic::Logic;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A bit-string of [`Logic`] levels.
///
/// Index 0 is the least-significant (rightmost) bit. Each level occupies 2 bits,
/// with 32 levels packed per `u64` word. A width of zero is the empty value,
/// used for "no value recorded yet".
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LogicVec {
    width: u32,
    /// Packed storage: 2 bits per level, 32 levels per u64.
    data: Vec<u64>,
}

/// Number of logic levels packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

impl LogicVec {
    /// Creates a new `LogicVec` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Creates the zero-width value.
    pub fn empty() -> Self {
        Self::new(0)
    }

    /// Creates a `LogicVec` with every position set to `fill`.
    pub fn filled(width: u32, fill: Logic) -> Self {
        let mut v = Self::new(width);
        if fill != Logic::Zero {
            for i in 0..width {
                v.set(i, fill);
            }
        }
        v
    }

    /// Returns the number of levels in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns true for the zero-width value.
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// Gets the level at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        match (self.data[word_idx] >> bit_offset) & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            _ => Logic::Z,
        }
    }

    /// Sets the level at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// The least-significant level, or `None` for the empty value.
    pub fn lsb(&self) -> Option<Logic> {
        (self.width > 0).then(|| self.get(0))
    }

    /// The most-significant level, or `None` for the empty value.
    pub fn msb(&self) -> Option<Logic> {
        (self.width > 0).then(|| self.get(self.width - 1))
    }

    /// Creates a `LogicVec` from a `u64` value with the given width.
    ///
    /// Bits beyond the given width are ignored.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Converts to a `u64` if every level is `0` or `1` and the width fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Parses a bit-string like `"10xz"`, leftmost character most significant.
    ///
    /// Returns `None` if the string contains anything but `0 1 x X z Z`.
    /// The empty string parses to the empty value.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let width = u32::try_from(s.len()).ok()?;
        let mut v = Self::new(width);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Logic::from_char(c)?);
        }
        Some(v)
    }

    /// Returns a copy resized to `width`.
    ///
    /// The low `min(width, self.width())` levels are kept; positions above the
    /// current width are filled with `fill`.
    pub fn resized(&self, width: u32, fill: Logic) -> Self {
        let mut v = Self::filled(width, fill);
        for i in 0..width.min(self.width) {
            v.set(i, self.get(i));
        }
        v
    }

    /// Left-pads with `fill` up to `width`; never truncates.
    pub fn padded_to(&self, width: u32, fill: Logic) -> Self {
        if width <= self.width {
            self.clone()
        } else {
            self.resized(width, fill)
        }
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}

impl Serialize for LogicVec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogicVec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        LogicVec::from_binary_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid bit-string '{s}'")))
    }
}

/// Returns the number of u64 words needed to store `width` levels.
fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}
