//! Error types for trace loading and parsing.

use std::io;

/// Errors that can occur while loading a trace.
///
/// Every variant is fatal for the trace being read; no partial trace is
/// produced.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// An I/O error occurred while reading or decompressing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A syntax or consistency error at a specific line.
    #[error("parse error at line {line}: {kind}")]
    Parse {
        /// The 1-based line number where the error occurred.
        line: usize,
        /// What went wrong.
        kind: ParseErrorKind,
    },

    /// The file is structurally incomplete.
    #[error("format error: {0}")]
    Format(String),
}

impl TraceError {
    pub(crate) fn at(line: usize, kind: ParseErrorKind) -> Self {
        TraceError::Parse { line, kind }
    }

    /// The line number of a parse error, if this is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            TraceError::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// The specific reason a trace line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// A `#<time>` marker whose time is not a non-negative integer.
    #[error("invalid time marker '{0}'")]
    InvalidTimestamp(String),

    /// A time marker earlier than the one before it.
    #[error("time marker #{time} is earlier than current time {current}")]
    TimeReversal {
        /// The offending marker value.
        time: u64,
        /// The time in effect before the marker.
        current: u64,
    },

    /// A value assignment to an identifier no `$var` declared.
    #[error("value change for undeclared identifier '{0}'")]
    UndeclaredIdentifier(String),

    /// A second assignment to the same identifier at the same time.
    #[error("identifier '{id}' changes twice at time {time}")]
    DuplicateChange {
        /// The identifier code.
        id: String,
        /// The timestamp of both changes.
        time: u64,
    },

    /// A malformed `$var` declaration.
    #[error("invalid $var declaration '{0}'")]
    InvalidVar(String),

    /// A `$var` width that is not a positive integer.
    #[error("invalid width '{0}' in $var")]
    InvalidWidth(String),

    /// A malformed `$scope` declaration.
    #[error("invalid $scope declaration '{0}'")]
    InvalidScope(String),

    /// An `$upscope` with no open scope.
    #[error("$upscope without matching $scope")]
    UnbalancedUpscope,

    /// A malformed `$timescale` declaration.
    #[error("invalid timescale '{0}'")]
    InvalidTimescale(String),

    /// A token in the value-change region that is not a valid assignment.
    #[error("invalid value change '{0}'")]
    InvalidValueChange(String),

    /// A token in the header region outside any declaration.
    #[error("unexpected '{0}' before $enddefinitions")]
    UnexpectedHeaderToken(String),

    /// A `$keyword` section that reaches end of input without `$end`.
    #[error("${0} section is missing $end")]
    Unterminated(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error_names_line() {
        let err = TraceError::at(12, ParseErrorKind::UndeclaredIdentifier("%".into()));
        assert_eq!(
            err.to_string(),
            "parse error at line 12: value change for undeclared identifier '%'"
        );
        assert_eq!(err.line(), Some(12));
    }

    #[test]
    fn display_time_reversal() {
        let kind = ParseErrorKind::TimeReversal {
            time: 5,
            current: 10,
        };
        assert_eq!(
            kind.to_string(),
            "time marker #5 is earlier than current time 10"
        );
    }

    #[test]
    fn display_format_error() {
        let err = TraceError::Format("missing $enddefinitions".into());
        assert_eq!(err.to_string(), "format error: missing $enddefinitions");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn display_io_error() {
        let err = TraceError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().starts_with("I/O error:"));
    }
}
