//! Sample-and-hold comparison of two change sequences.

use serde::{Deserialize, Serialize};
use tracecmp_common::{Logic, LogicVec};
use tracecmp_trace::ValueChange;

/// How the narrower of two sampled values is widened before comparison.
///
/// `Zero` treats a missing high bit (including the empty value before a
/// signal's first change) as numeric zero. `Unknown` treats it as `x`, which
/// keeps untraced bits from silently matching a driven `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingPolicy {
    /// Left-pad with `0`.
    #[default]
    Zero,
    /// Left-pad with `x`.
    Unknown,
}

impl PaddingPolicy {
    /// The level used for padding.
    pub fn fill(self) -> Logic {
        match self {
            PaddingPolicy::Zero => Logic::Zero,
            PaddingPolicy::Unknown => Logic::X,
        }
    }
}

/// Settings for [`diff_waveforms`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffOptions {
    /// Width normalization policy.
    pub padding: PaddingPolicy,
    /// Stop after this many divergences; 0 collects all of them.
    pub max_divergences: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            padding: PaddingPolicy::Zero,
            max_divergences: 1,
        }
    }
}

/// One instant at which two waveforms disagree.
///
/// `left` and `right` are the padded values that were compared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Divergence {
    /// Timestamp of the disagreement.
    pub time: u64,
    /// Value of the first waveform.
    pub left: LogicVec,
    /// Value of the second waveform.
    pub right: LogicVec,
}

/// The outcome of comparing two waveforms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WaveformDiff {
    /// Divergences in time order, at most `max_divergences` of them.
    pub divergences: Vec<Divergence>,
}

impl WaveformDiff {
    /// Whether the waveforms disagree anywhere.
    pub fn differs(&self) -> bool {
        !self.divergences.is_empty()
    }

    /// The earliest divergence.
    pub fn first(&self) -> Option<&Divergence> {
        self.divergences.first()
    }
}

/// Compares two values after padding the narrower one to the wider width.
pub fn values_equal(left: &LogicVec, right: &LogicVec, padding: PaddingPolicy) -> bool {
    let fill = padding.fill();
    let width = left.width().max(right.width());
    (0..width).all(|i| padded_bit(left, i, fill) == padded_bit(right, i, fill))
}

fn padded_bit(value: &LogicVec, index: u32, fill: Logic) -> Logic {
    if index < value.width() {
        value.get(index)
    } else {
        fill
    }
}

/// Compares two change sequences over the union of their timestamps.
///
/// At each timestamp both sides are sampled with sample-and-hold semantics (a
/// side with no change yet reads as the empty value) and compared with
/// [`values_equal`]. Both inputs must be sorted by time.
pub fn diff_waveforms(
    left: &[ValueChange],
    right: &[ValueChange],
    options: &DiffOptions,
) -> WaveformDiff {
    let empty = LogicVec::empty();
    let fill = options.padding.fill();
    let mut divergences = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);

    loop {
        let time = match (left.get(i), right.get(j)) {
            (Some(a), Some(b)) => a.time.min(b.time),
            (Some(a), None) => a.time,
            (None, Some(b)) => b.time,
            (None, None) => break,
        };
        while i < left.len() && left[i].time <= time {
            i += 1;
        }
        while j < right.len() && right[j].time <= time {
            j += 1;
        }

        let a = i.checked_sub(1).map_or(&empty, |k| &left[k].value);
        let b = j.checked_sub(1).map_or(&empty, |k| &right[k].value);
        if !values_equal(a, b, options.padding) {
            let width = a.width().max(b.width());
            divergences.push(Divergence {
                time,
                left: a.padded_to(width, fill),
                right: b.padded_to(width, fill),
            });
            if options.max_divergences != 0 && divergences.len() >= options.max_divergences {
                break;
            }
        }
    }

    WaveformDiff { divergences }
}
