//! Reading traces from files and readers.
//!
//! A trace is always read fully into memory before parsing. Gzip-compressed
//! dumps (`*.vcd.gz`) are recognized by their magic bytes, not by extension.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::TraceError;
use crate::parser::{parse_trace, ParseOptions};
use crate::trace::Trace;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Loads a trace from any reader, decompressing gzip input.
///
/// # Errors
///
/// Returns [`TraceError::Io`] on read or decompression failures and the
/// parser's errors otherwise.
pub fn load_trace<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Trace, TraceError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes.as_slice()).read_to_end(&mut decoded)?;
        debug!(
            compressed = bytes.len(),
            decompressed = decoded.len(),
            "decompressed gzip trace"
        );
        bytes = decoded;
    }

    parse_trace(&bytes, options)
}

/// Loads a trace from a filesystem path.
///
/// # Errors
///
/// See [`load_trace`].
pub fn load_trace_file(path: &Path, options: &ParseOptions) -> Result<Trace, TraceError> {
    debug!(path = %path.display(), "loading trace");
    let file = File::open(path)?;
    load_trace(BufReader::new(file), options)
}
