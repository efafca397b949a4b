//! The in-memory trace model: declared signals and their value changes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracecmp_common::LogicVec;

use crate::timescale::Timescale;

/// The opaque identifier code a `$var` declaration binds a signal to
/// (e.g. `!`, `"#`, `%a`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdCode(pub String);

impl IdCode {
    /// The raw identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single recorded transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChange {
    /// Timestamp in the trace's timescale ticks.
    pub time: u64,
    /// The value from this time on.
    pub value: LogicVec,
}

impl ValueChange {
    /// Creates a change record.
    pub fn new(time: u64, value: LogicVec) -> Self {
        Self { time, value }
    }
}

/// Returns the value in effect at `time` under sample-and-hold semantics.
///
/// This is the latest change with a timestamp at or before `time`, or `None`
/// when `time` precedes the first change. `changes` must be sorted by time.
pub fn value_at(changes: &[ValueChange], time: u64) -> Option<&LogicVec> {
    let after = changes.partition_point(|c| c.time <= time);
    after.checked_sub(1).map(|i| &changes[i].value)
}

/// A declared signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Signal {
    /// Hierarchical name as declared, dot-separated, original casing.
    pub name: String,
    /// Lower-cased name used for every lookup and comparison.
    pub key: String,
    /// Identifier code whose changes this signal reads.
    pub id: IdCode,
    /// Declared bit width (1 for scalars).
    pub width: u32,
    /// Declared variable type (`wire`, `reg`, `integer`, ...).
    pub var_type: String,
}

/// The change history recorded for one identifier code, shared by every
/// signal declared with that code.
#[derive(Clone, Debug)]
pub(crate) struct Waveform {
    pub(crate) width: u32,
    pub(crate) changes: Vec<ValueChange>,
    /// Indices into `Trace::signals` of every alias of this code.
    pub(crate) aliases: Vec<usize>,
}

/// One parsed value change dump.
///
/// Immutable after construction. Identifier codes map many-to-one: several
/// declared signals may share one code and therefore one change sequence.
#[derive(Clone, Debug)]
pub struct Trace {
    pub(crate) timescale: Timescale,
    pub(crate) date: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) signals: Vec<Signal>,
    pub(crate) waveforms: Vec<Waveform>,
    pub(crate) by_id: HashMap<IdCode, usize>,
    /// Lower-cased name to signal index; the first declaration of a key wins.
    pub(crate) by_key: HashMap<String, usize>,
}

impl Trace {
    /// The trace's `$timescale` (1 fs per tick if none was declared).
    pub fn timescale(&self) -> Timescale {
        self.timescale
    }

    /// The `$date` text, if present.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// The `$version` text, if present.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// All declared signals in declaration order, aliases included.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Looks a signal up by name, case-insensitively.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.by_key
            .get(&name.to_lowercase())
            .map(|&idx| &self.signals[idx])
    }

    /// The distinct lower-cased signal names, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.signals
            .iter()
            .enumerate()
            .filter(|(idx, s)| self.by_key.get(&s.key) == Some(idx))
            .map(|(_, s)| s.key.as_str())
    }

    /// The recorded changes of a signal, sorted by strictly increasing time.
    pub fn changes(&self, signal: &Signal) -> &[ValueChange] {
        self.by_id
            .get(&signal.id)
            .map(|&w| self.waveforms[w].changes.as_slice())
            .unwrap_or(&[])
    }

    /// Every signal declared with the given identifier code.
    pub fn aliases(&self, id: &IdCode) -> Vec<&Signal> {
        self.by_id
            .get(id)
            .map(|&w| {
                self.waveforms[w]
                    .aliases
                    .iter()
                    .map(|&idx| &self.signals[idx])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The width changes of `id` are stored at (that of its first declaration).
    pub fn id_width(&self, id: &IdCode) -> Option<u32> {
        self.by_id.get(id).map(|&w| self.waveforms[w].width)
    }

    /// Number of distinct identifier codes.
    pub fn id_count(&self) -> usize {
        self.waveforms.len()
    }

    /// Total number of recorded changes across all identifier codes.
    pub fn change_count(&self) -> usize {
        self.waveforms.iter().map(|w| w.changes.len()).sum()
    }

    /// The latest timestamp of any recorded change.
    pub fn end_time(&self) -> Option<u64> {
        self.waveforms
            .iter()
            .filter_map(|w| w.changes.last().map(|c| c.time))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(pairs: &[(u64, &str)]) -> Vec<ValueChange> {
        pairs
            .iter()
            .map(|&(t, v)| ValueChange::new(t, LogicVec::from_binary_str(v).unwrap()))
            .collect()
    }

    #[test]
    fn value_at_holds_last_value() {
        let c = changes(&[(0, "0"), (10, "1")]);
        assert_eq!(value_at(&c, 5).map(|v| v.to_string()), Some("0".into()));
        assert_eq!(value_at(&c, 10).map(|v| v.to_string()), Some("1".into()));
        assert_eq!(value_at(&c, 15).map(|v| v.to_string()), Some("1".into()));
    }

    #[test]
    fn value_at_before_first_change_is_undefined() {
        let c = changes(&[(3, "1")]);
        assert_eq!(value_at(&c, 0), None);
        assert_eq!(value_at(&c, 2), None);
        assert_eq!(value_at(&[], 100), None);
    }
}
