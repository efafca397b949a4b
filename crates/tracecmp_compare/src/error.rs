//! Comparison error types.

use std::path::PathBuf;

use tracecmp_trace::TraceError;

/// Errors that abort a comparison.
///
/// Missing bits and names present in only one trace are not errors; they
/// surface as `x` values and as exclusive names in the report.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// One of the input traces could not be loaded.
    #[error("{}: {source}", path.display())]
    Load {
        /// The file that failed.
        path: PathBuf,
        /// Why it failed.
        #[source]
        source: TraceError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracecmp_trace::ParseErrorKind;

    #[test]
    fn display_names_file_and_cause() {
        let err = CompareError::Load {
            path: PathBuf::from("run_b.vcd"),
            source: TraceError::Parse {
                line: 42,
                kind: ParseErrorKind::InvalidTimestamp("#x".into()),
            },
        };
        assert_eq!(
            err.to_string(),
            "run_b.vcd: parse error at line 42: invalid time marker '#x'"
        );
    }
}
