//! Report rendering.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tracecmp_compare::ComparisonReport;

/// How the two traces and their timestamps are labelled in text output.
pub struct TextLabels {
    /// Display name of the first trace.
    pub first: String,
    /// Display name of the second trace.
    pub second: String,
    /// Unit appended to divergence times, if they are not raw ticks.
    pub time_unit: Option<&'static str>,
}

/// Writes the four report sections followed by a one-line summary.
pub fn render_text(
    report: &ComparisonReport,
    labels: &TextLabels,
    out: &mut dyn Write,
) -> io::Result<()> {
    name_section(out, "Common signals", &report.common)?;
    name_section(out, &format!("Only in {}", labels.first), &report.only_in_first)?;
    name_section(out, &format!("Only in {}", labels.second), &report.only_in_second)?;

    writeln!(out, "=== Divergent signals ({}) ===", report.divergent.len())?;
    if report.divergent.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for signal in &report.divergent {
        writeln!(out, "  {}", signal.name)?;
        for d in &signal.divergences {
            let unit = labels.time_unit.map(|u| format!(" {u}")).unwrap_or_default();
            writeln!(out, "    at {}{unit}: {} != {}", d.time, d.left, d.right)?;
        }
    }
    writeln!(out)?;

    if report.is_identical() {
        writeln!(out, "traces are identical")
    } else {
        writeln!(
            out,
            "traces differ: {} divergent, {} only in first, {} only in second",
            report.divergent.len(),
            report.only_in_first.len(),
            report.only_in_second.len()
        )
    }
}

fn name_section(out: &mut dyn Write, title: &str, names: &[String]) -> io::Result<()> {
    writeln!(out, "=== {title} ({}) ===", names.len())?;
    if names.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for name in names {
        writeln!(out, "  {name}")?;
    }
    writeln!(out)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    first: &'a Path,
    second: &'a Path,
    identical: bool,
    #[serde(flatten)]
    report: &'a ComparisonReport,
}

/// Writes the report as a pretty-printed JSON object.
pub fn render_json(
    report: &ComparisonReport,
    first: &Path,
    second: &Path,
    out: &mut dyn Write,
) -> io::Result<()> {
    let json = JsonReport {
        first,
        second,
        identical: report.is_identical(),
        report,
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)
}
