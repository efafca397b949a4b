//! Whole-trace comparison: name partitioning plus per-signal diffing.

use std::borrow::Cow;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracecmp_trace::{load_trace_file, ParseOptions, Timescale, Trace, ValueChange};
use tracing::{debug, info, warn};

use crate::diff::{diff_waveforms, DiffOptions, Divergence, PaddingPolicy};
use crate::error::CompareError;
use crate::group::{group_trace, CanonicalSignal};
use crate::reconstruct::reconstruct;

/// Settings for [`compare_traces`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CompareOptions {
    /// Width normalization policy.
    pub padding: PaddingPolicy,
    /// Divergences to record per signal; 0 records all.
    pub max_divergences: usize,
    /// Convert both traces' timestamps to femtoseconds before diffing.
    pub align_timescales: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            padding: PaddingPolicy::Zero,
            max_divergences: 1,
            align_timescales: false,
        }
    }
}

impl CompareOptions {
    /// The per-waveform part of these options.
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            padding: self.padding,
            max_divergences: self.max_divergences,
        }
    }
}

/// A common signal whose waveforms disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignalDivergence {
    /// Canonical name.
    pub name: String,
    /// Disagreements in time order; never empty.
    pub divergences: Vec<Divergence>,
}

impl SignalDivergence {
    /// Time of the earliest disagreement.
    pub fn first_time(&self) -> Option<u64> {
        self.divergences.first().map(|d| d.time)
    }
}

/// The result of comparing two traces.
///
/// All name lists are sorted canonical names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    /// Names present in both traces.
    pub common: Vec<String>,
    /// Names present only in the first trace.
    pub only_in_first: Vec<String>,
    /// Names present only in the second trace.
    pub only_in_second: Vec<String>,
    /// Common names whose waveforms differ, sorted by name.
    pub divergent: Vec<SignalDivergence>,
}

impl ComparisonReport {
    /// True when both traces have the same names and no waveform differs.
    pub fn is_identical(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty() && self.divergent.is_empty()
    }

    /// Names of the divergent signals.
    pub fn divergent_names(&self) -> impl Iterator<Item = &str> {
        self.divergent.iter().map(|d| d.name.as_str())
    }
}

/// Compares two parsed traces.
///
/// Names are grouped per trace, partitioned into common and exclusive sets,
/// and every common name's waveforms are diffed. Names present in only one
/// trace are reported but never diffed.
pub fn compare_traces(first: &Trace, second: &Trace, options: &CompareOptions) -> ComparisonReport {
    let left = group_trace(first);
    let right = group_trace(second);

    let common: Vec<String> = left
        .names()
        .filter(|name| right.contains(name))
        .map(str::to_string)
        .collect();
    let only_in_first: Vec<String> = left
        .names()
        .filter(|name| !right.contains(name))
        .map(str::to_string)
        .collect();
    let only_in_second: Vec<String> = right
        .names()
        .filter(|name| !left.contains(name))
        .map(str::to_string)
        .collect();

    let (scale_first, scale_second) = if options.align_timescales {
        (Some(first.timescale()), Some(second.timescale()))
    } else {
        (None, None)
    };
    let diff_options = options.diff_options();

    let divergent: Vec<SignalDivergence> = common
        .par_iter()
        .filter_map(|name| {
            let a = waveform(first, name, left.get(name)?, scale_first);
            let b = waveform(second, name, right.get(name)?, scale_second);
            let diff = diff_waveforms(&a, &b, &diff_options);
            if diff.differs() {
                debug!(signal = %name, time = ?diff.first().map(|d| d.time), "signals diverge");
            }
            diff.differs().then(|| SignalDivergence {
                name: name.clone(),
                divergences: diff.divergences,
            })
        })
        .collect();

    info!(
        common = common.len(),
        only_in_first = only_in_first.len(),
        only_in_second = only_in_second.len(),
        divergent = divergent.len(),
        "comparison finished"
    );

    ComparisonReport {
        common,
        only_in_first,
        only_in_second,
        divergent,
    }
}

/// The change sequence behind a canonical name, in femtoseconds when a
/// timescale is given.
///
/// Ticks past [`Timescale::max_ticks`] saturate to `u64::MAX`, so late
/// changes may land on one instant; that is logged.
fn waveform<'t>(
    trace: &'t Trace,
    name: &str,
    signal: &CanonicalSignal,
    timescale: Option<Timescale>,
) -> Cow<'t, [ValueChange]> {
    let changes = match signal {
        CanonicalSignal::Plain(key) => {
            Cow::Borrowed(trace.signal(key).map_or(&[][..], |s| trace.changes(s)))
        }
        CanonicalSignal::Vector(group) => Cow::Owned(reconstruct(group, trace)),
    };
    let Some(timescale) = timescale else {
        return changes;
    };
    if timescale.femtoseconds_per_tick() == 1 {
        return changes;
    }
    if let Some(last) = changes.last().filter(|c| c.time > timescale.max_ticks()) {
        warn!(
            signal = %name,
            %timescale,
            time = last.time,
            "change times overflow femtoseconds; late changes collapse onto the last instant"
        );
    }
    Cow::Owned(
        changes
            .iter()
            .map(|c| ValueChange::new(timescale.ticks_to_fs(c.time), c.value.clone()))
            .collect(),
    )
}

/// Loads two dump files in parallel and compares them.
///
/// # Errors
///
/// Returns [`CompareError::Load`] naming the file that could not be read or
/// parsed. When both fail, the first file's error is returned.
pub fn compare_files(
    first: &Path,
    second: &Path,
    parse: &ParseOptions,
    compare: &CompareOptions,
) -> Result<ComparisonReport, CompareError> {
    let (a, b) = rayon::join(|| load(first, parse), || load(second, parse));
    let (a, b) = (a?, b?);
    Ok(compare_traces(&a, &b, compare))
}

fn load(path: &Path, options: &ParseOptions) -> Result<Trace, CompareError> {
    load_trace_file(path, options).map_err(|source| CompareError::Load {
        path: path.to_path_buf(),
        source,
    })
}
