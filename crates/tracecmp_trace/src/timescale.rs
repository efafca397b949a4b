//! `$timescale` units and their femtosecond conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// A time unit accepted in `$timescale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Picoseconds.
    Ps,
    /// Femtoseconds.
    Fs,
}

impl TimeUnit {
    fn from_suffix(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s" => Some(TimeUnit::S),
            "ms" => Some(TimeUnit::Ms),
            "us" => Some(TimeUnit::Us),
            "ns" => Some(TimeUnit::Ns),
            "ps" => Some(TimeUnit::Ps),
            "fs" => Some(TimeUnit::Fs),
            _ => None,
        }
    }

    /// Femtoseconds in one of this unit.
    pub fn femtoseconds(self) -> u64 {
        match self {
            TimeUnit::S => FS_PER_S,
            TimeUnit::Ms => FS_PER_MS,
            TimeUnit::Us => FS_PER_US,
            TimeUnit::Ns => FS_PER_NS,
            TimeUnit::Ps => FS_PER_PS,
            TimeUnit::Fs => 1,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        };
        f.write_str(s)
    }
}

/// The duration of one tick of a trace's `#<time>` markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timescale {
    /// Multiplier, usually 1, 10 or 100.
    pub magnitude: u64,
    /// Unit the multiplier applies to.
    pub unit: TimeUnit,
}

impl Default for Timescale {
    fn default() -> Self {
        Self {
            magnitude: 1,
            unit: TimeUnit::Fs,
        }
    }
}

impl Timescale {
    /// Parses the body of a `$timescale` section, e.g. `"10ps"` or `"1 ns"`.
    ///
    /// A missing magnitude means 1. Returns `None` for unknown units or a
    /// zero magnitude.
    pub fn parse(body: &str) -> Option<Self> {
        let s: String = body.split_whitespace().collect();
        let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (num_str, unit_str) = s.split_at(digit_end);
        let magnitude = if num_str.is_empty() {
            1
        } else {
            num_str.parse().ok()?
        };
        if magnitude == 0 {
            return None;
        }
        let unit = TimeUnit::from_suffix(unit_str)?;
        Some(Self { magnitude, unit })
    }

    /// Femtoseconds per tick.
    pub fn femtoseconds_per_tick(&self) -> u64 {
        self.magnitude.saturating_mul(self.unit.femtoseconds())
    }

    /// Converts a tick count in this timescale to femtoseconds, saturating at
    /// `u64::MAX` beyond [`max_ticks`](Self::max_ticks).
    pub fn ticks_to_fs(&self, ticks: u64) -> u64 {
        ticks.saturating_mul(self.femtoseconds_per_tick())
    }

    /// The largest tick count that converts to femtoseconds exactly.
    pub fn max_ticks(&self) -> u64 {
        u64::MAX
            .checked_div(self.femtoseconds_per_tick())
            .unwrap_or(u64::MAX)
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit)
    }
}
