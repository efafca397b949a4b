//! Shared value types for the tracecmp waveform comparator.
//!
//! Every value recorded in a trace is a bit-string over the four VCD logic
//! levels `0`, `1`, `x` and `z`. [`Logic`] is one such level and
//! [`LogicVec`] a packed string of them.

#![warn(missing_docs)]

pub mod logic;
pub mod logic_vec;

pub use logic::Logic;
pub use logic_vec::LogicVec;
