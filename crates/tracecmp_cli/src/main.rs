//! tracecmp: compares two value change dumps signal by signal.
//!
//! Prints the signals common to both traces, those present in only one, and
//! the common signals whose waveforms diverge. Exits 0 when the traces are
//! identical, 1 when they differ, and 2 when either cannot be loaded.

#![warn(missing_docs)]

mod compare;
mod report;

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracecmp_compare::PaddingPolicy;
use tracecmp_trace::DuplicatePolicy;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Compare two value change dump files.
#[derive(Parser, Debug)]
#[command(name = "tracecmp", version, about = "Value change dump comparator")]
pub struct Cli {
    /// Suppress all output except errors; the exit code carries the result.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a `tracecmp.toml` configuration file. Defaults to
    /// `./tracecmp.toml` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// The reference trace (`.vcd` or gzip-compressed `.vcd.gz`).
    pub first: PathBuf,

    /// The trace compared against the reference.
    pub second: PathBuf,

    /// How the narrower of two values is widened before comparison.
    #[arg(long, value_enum)]
    pub padding: Option<PaddingArg>,

    /// Divergences to report per signal; 0 reports all.
    #[arg(short = 'n', long)]
    pub max_divergences: Option<usize>,

    /// Compare in real time (femtoseconds) instead of raw ticks.
    #[arg(long)]
    pub align_timescales: bool,

    /// What to do when one identifier changes twice at the same timestamp.
    #[arg(long, value_enum)]
    pub duplicate_changes: Option<DuplicateArg>,

    /// Output format for the report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Padding policy as spelled on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PaddingArg {
    /// Left-pad with `0`.
    Zero,
    /// Left-pad with `x`.
    Unknown,
}

impl From<PaddingArg> for PaddingPolicy {
    fn from(arg: PaddingArg) -> Self {
        match arg {
            PaddingArg::Zero => PaddingPolicy::Zero,
            PaddingArg::Unknown => PaddingPolicy::Unknown,
        }
    }
}

/// Duplicate-change policy as spelled on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DuplicateArg {
    /// Fail the parse.
    Reject,
    /// Keep the last value written.
    LastWins,
}

impl From<DuplicateArg> for DuplicatePolicy {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::Reject => DuplicatePolicy::Reject,
            DuplicateArg::LastWins => DuplicatePolicy::LastWins,
        }
    }
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Exit code for a completed comparison with no differences.
pub const EXIT_IDENTICAL: i32 = 0;
/// Exit code for a completed comparison that found differences.
pub const EXIT_DIFFERENT: i32 = 1;
/// Exit code when the comparison could not be carried out.
pub const EXIT_ERROR: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let stdout = std::io::stdout();
    match compare::run(&cli, &mut stdout.lock()) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(EXIT_ERROR);
        }
    }
}

/// Installs the stderr log subscriber.
fn init_logging(cli: &Cli) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(default_level(cli), env.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `RUST_LOG` directives when set; otherwise the level chosen by `-q`/`-v`.
fn log_filter(default: LevelFilter, env: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .parse_lossy(env.unwrap_or_default())
}

fn default_level(cli: &Cli) -> LevelFilter {
    if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positional_files() {
        let cli = Cli::parse_from(["tracecmp", "a.vcd", "b.vcd.gz"]);
        assert_eq!(cli.first, PathBuf::from("a.vcd"));
        assert_eq!(cli.second, PathBuf::from("b.vcd.gz"));
        assert!(cli.padding.is_none());
        assert!(cli.max_divergences.is_none());
        assert!(cli.duplicate_changes.is_none());
        assert!(!cli.align_timescales);
        assert_eq!(cli.format, ReportFormat::Text);
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_all_options() {
        let cli = Cli::parse_from([
            "tracecmp",
            "--config",
            "ci/tracecmp.toml",
            "a.vcd",
            "b.vcd",
            "--padding",
            "unknown",
            "--max-divergences",
            "0",
            "--align-timescales",
            "--duplicate-changes",
            "last-wins",
            "--format",
            "json",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("ci/tracecmp.toml")));
        assert_eq!(cli.padding, Some(PaddingArg::Unknown));
        assert_eq!(cli.max_divergences, Some(0));
        assert!(cli.align_timescales);
        assert_eq!(cli.duplicate_changes, Some(DuplicateArg::LastWins));
        assert_eq!(cli.format, ReportFormat::Json);
    }

    #[test]
    fn parse_short_flags() {
        let cli = Cli::parse_from(["tracecmp", "-q", "-n", "3", "-f", "json", "a.vcd", "b.vcd"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.max_divergences, Some(3));
        assert_eq!(cli.format, ReportFormat::Json);
    }

    #[test]
    fn second_file_is_required() {
        assert!(Cli::try_parse_from(["tracecmp", "a.vcd"]).is_err());
    }

    #[test]
    fn unknown_padding_is_rejected() {
        assert!(Cli::try_parse_from(["tracecmp", "a.vcd", "b.vcd", "--padding", "ones"]).is_err());
    }

    #[test]
    fn arg_enums_map_to_policies() {
        assert_eq!(PaddingPolicy::from(PaddingArg::Zero), PaddingPolicy::Zero);
        assert_eq!(PaddingPolicy::from(PaddingArg::Unknown), PaddingPolicy::Unknown);
        assert_eq!(DuplicatePolicy::from(DuplicateArg::Reject), DuplicatePolicy::Reject);
        assert_eq!(DuplicatePolicy::from(DuplicateArg::LastWins), DuplicatePolicy::LastWins);
    }

    #[test]
    fn rust_log_replaces_the_default_level() {
        let hint = |env| log_filter(LevelFilter::WARN, env).max_level_hint();
        assert_eq!(hint(None), Some(LevelFilter::WARN));
        assert_eq!(hint(Some("")), Some(LevelFilter::WARN));
        assert_eq!(hint(Some("debug")), Some(LevelFilter::DEBUG));
        assert_eq!(hint(Some("error")), Some(LevelFilter::ERROR));
    }

    #[test]
    fn verbosity_selects_log_level() {
        let level = |args: &[&str]| default_level(&Cli::parse_from(args));
        assert_eq!(level(&["tracecmp", "a", "b"]), LevelFilter::WARN);
        assert_eq!(level(&["tracecmp", "-v", "a", "b"]), LevelFilter::DEBUG);
        assert_eq!(level(&["tracecmp", "-q", "a", "b"]), LevelFilter::ERROR);
    }
}
