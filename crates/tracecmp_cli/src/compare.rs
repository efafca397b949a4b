//! The comparison run: configuration, loading, diffing and reporting.

use std::error::Error;
use std::io::Write;

use tracecmp_compare::compare_files;
use tracecmp_config::{find_config, load_config, ToolConfig};
use tracing::debug;

use crate::report::{render_json, render_text, TextLabels};
use crate::{Cli, ReportFormat, EXIT_DIFFERENT, EXIT_IDENTICAL};

/// Runs one comparison and writes the report to `out`.
///
/// Returns the process exit code for a completed comparison.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<i32, Box<dyn Error>> {
    let config = apply_overrides(resolve_config(cli)?, cli);
    debug!(?config, "effective configuration");

    let report = compare_files(&cli.first, &cli.second, &config.parse, &config.compare)?;

    if !cli.quiet {
        match cli.format {
            ReportFormat::Text => {
                let labels = TextLabels {
                    first: cli.first.display().to_string(),
                    second: cli.second.display().to_string(),
                    time_unit: config.compare.align_timescales.then_some("fs"),
                };
                render_text(&report, &labels, out)?;
            }
            ReportFormat::Json => render_json(&report, &cli.first, &cli.second, out)?,
        }
    }

    Ok(if report.is_identical() {
        EXIT_IDENTICAL
    } else {
        EXIT_DIFFERENT
    })
}

/// Loads `--config`, or `./tracecmp.toml` when present, or the defaults.
fn resolve_config(cli: &Cli) -> Result<ToolConfig, Box<dyn Error>> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => std::env::current_dir().ok().and_then(|dir| find_config(&dir)),
    };
    match path {
        Some(path) => load_config(&path)
            .map_err(|e| -> Box<dyn Error> { format!("{}: {e}", path.display()).into() }),
        None => Ok(ToolConfig::default()),
    }
}

/// Command-line flags take precedence over the configuration file.
fn apply_overrides(mut config: ToolConfig, cli: &Cli) -> ToolConfig {
    if let Some(padding) = cli.padding {
        config.compare.padding = padding.into();
    }
    if let Some(limit) = cli.max_divergences {
        config.compare.max_divergences = limit;
    }
    if cli.align_timescales {
        config.compare.align_timescales = true;
    }
    if let Some(policy) = cli.duplicate_changes {
        config.parse.duplicate_changes = policy.into();
    }
    config
}
