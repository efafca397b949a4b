//! Four-state logic levels as they appear in value-change dumps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single four-state logic level.
///
/// - `Zero`: driven low
/// - `One`: driven high
/// - `X`: unknown, uninitialized, or not recorded
/// - `Z`: high impedance
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown.
    X = 2,
    /// High-impedance.
    Z = 3,
}

impl Logic {
    /// Converts a VCD value character to a [`Logic`] level.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Returns the lower-case VCD spelling of this level.
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }

    /// Returns true for `X` and `Z`.
    pub fn is_unknown(self) -> bool {
        matches!(self, Logic::X | Logic::Z)
    }

    /// The level a VCD reader left-extends a short value with when this is
    /// its leftmost given bit.
    ///
    /// `x` and `z` extend as themselves; `0` and `1` extend with `0`.
    pub fn extension_fill(self) -> Self {
        match self {
            Logic::X => Logic::X,
            Logic::Z => Logic::Z,
            Logic::Zero | Logic::One => Logic::Zero,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
