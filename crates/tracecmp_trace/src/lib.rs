//! Value change dump parsing and the in-memory trace model.
//!
//! A [`Trace`] holds the signals a dump declares and, per identifier code,
//! the ordered sequence of [`ValueChange`]s recorded for it. Identifier codes
//! may be shared by several declared names; all aliases read the same
//! changes.
//!
//! # Usage
//!
//! ```ignore
//! use tracecmp_trace::{load_trace_file, ParseOptions};
//!
//! let trace = load_trace_file(Path::new("counter_tb.vcd"), &ParseOptions::default())?;
//! let clk = trace.signal("counter_tb.clk").unwrap();
//! println!("{} changes", trace.changes(clk).len());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod parser;
pub mod timescale;
pub mod trace;

pub use error::{ParseErrorKind, TraceError};
pub use loader::{load_trace, load_trace_file};
pub use parser::{parse_str, parse_trace, DuplicatePolicy, ParseOptions};
pub use timescale::{TimeUnit, Timescale};
pub use trace::{value_at, IdCode, Signal, Trace, ValueChange};
