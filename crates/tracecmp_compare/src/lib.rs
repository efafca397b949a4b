//! Comparison engine for value change dumps.
//!
//! # Pipeline
//!
//! 1. `group`: partition a trace's names into plain signals and buses
//!    synthesized from per-bit members (`cnt[0]`..`cnt[3]` → `cnt[3:0]`)
//! 2. `reconstruct`: rebuild a synthesized bus's change sequence from its
//!    members
//! 3. `diff`: compare two change sequences with sample-and-hold semantics
//!    and width normalization
//! 4. `compare`: partition canonical names between two traces and diff the
//!    common ones into a [`ComparisonReport`]
//!
//! # Usage
//!
//! ```ignore
//! use tracecmp_compare::{compare_files, CompareOptions};
//! use tracecmp_trace::ParseOptions;
//!
//! let report = compare_files(a, b, &ParseOptions::default(), &CompareOptions::default())?;
//! for sig in &report.divergent {
//!     println!("{} differs from t={:?}", sig.name, sig.first_time());
//! }
//! ```

#![warn(missing_docs)]

pub mod compare;
pub mod diff;
pub mod error;
pub mod group;
pub mod reconstruct;

pub use compare::{compare_files, compare_traces, CompareOptions, ComparisonReport, SignalDivergence};
pub use diff::{diff_waveforms, values_equal, DiffOptions, Divergence, PaddingPolicy, WaveformDiff};
pub use error::CompareError;
pub use group::{group_names, group_signals, group_trace, CanonicalSignal, SignalGrouping, VectorGroup};
pub use reconstruct::reconstruct;
