//! Text rendering and persistence of the run report

use crate::entry::ReportEntry;
use crate::error::ReportWriteError;
use crate::report::RunReport;
use remedy_engine::FixVerdict;
use std::path::Path;
use std::time::Duration;

const BANNER: &str = "============================================================";
const DIVIDER: &str = "----------------------------------------";

fn fmt_duration(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}

/// Render the report as a flat human-readable document
#[must_use]
pub fn render(report: &RunReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    let totals = report.totals();

    lines.push(BANNER.to_string());
    lines.push("AUTOMATED REMEDIATION REPORT".to_string());
    lines.push(BANNER.to_string());
    lines.push(format!(
        "Generated: {}",
        report.finished_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!("Model: {}", report.model()));
    lines.push(format!("Total Bugs Processed: {}", totals.total));
    lines.push(String::new());

    lines.push("SUMMARY:".to_string());
    lines.push(format!("- Solutions Generated: {}", totals.solved));
    lines.push(format!("- Failures: {}", totals.failed));
    lines.push(format!("- Success Rate: {:.1}%", totals.success_rate()));
    lines.push(format!("- Total Elapsed: {}", fmt_duration(totals.elapsed)));
    lines.push(String::new());

    for (i, entry) in report.entries().enumerate() {
        render_entry(&mut lines, i + 1, entry);
        lines.push(String::new());
    }

    if !report.settings().is_empty() {
        lines.push("TECHNICAL DETAILS:".to_string());
        lines.push(format!("- Model: {}", report.model()));
        for (key, value) in report.settings() {
            lines.push(format!("- {key}: {value}"));
        }
        lines.push(String::new());
    }

    lines.push("GENERAL RECOMMENDATIONS:".to_string());
    if totals.failed > 0 {
        lines.push("- Review the failure analysis sections for unsolved bugs.".to_string());
        lines.push("- Consult the run logs for per-attempt error details.".to_string());
        lines.push(
            "- Refine bug descriptions or file hints if solutions are consistently rejected."
                .to_string(),
        );
    } else {
        lines.push("- All solutions generated; review them for accuracy.".to_string());
        lines.push("- Apply the snippets to the codebase manually.".to_string());
        lines.push("- Test the application thoroughly after applying changes.".to_string());
    }

    lines.join("\n")
}

fn render_entry(lines: &mut Vec<String>, position: usize, entry: &ReportEntry) {
    let status = if entry.is_solved() {
        "SOLUTION_GENERATED"
    } else {
        "FAILED"
    };

    lines.push(format!("BUG {position}: {} [{}]", entry.title, entry.bug_id));
    lines.push(format!("Status: {status}"));
    lines.push(DIVIDER.to_string());
    lines.push(format!("Category: {}", entry.category));
    lines.push(format!("Root Cause: {}", entry.root_cause));
    lines.push(format!("Fix Concept: {}", entry.fix_concept));
    lines.push(format!("Files Affected: {}", entry.files.join(", ")));

    match &entry.result.verdict {
        FixVerdict::SolutionGenerated {
            snippet,
            winning_attempt,
        } => {
            lines.push(format!(
                "Attempts: {} (accepted on attempt {winning_attempt})",
                entry.result.attempt_count()
            ));
            lines.push(format!("Elapsed: {}", fmt_duration(entry.result.elapsed)));
            lines.push(String::new());
            lines.push("--- GENERATED CODE SOLUTION ---".to_string());
            lines.push(snippet.trim_end().to_string());
            lines.push("-------------------------------".to_string());
        }
        FixVerdict::Failed { last_outcome } => {
            lines.push(format!(
                "Attempts: {} (last outcome: {last_outcome})",
                entry.result.attempt_count()
            ));
            lines.push(format!("Elapsed: {}", fmt_duration(entry.result.elapsed)));
            if let Some(advice) = &entry.advice {
                lines.push(String::new());
                lines.push("--- FAILURE ANALYSIS AND SUGGESTED SOLUTION ---".to_string());
                lines.push(advice.trim_end().to_string());
                lines.push("-----------------------------------------------".to_string());
            }
        }
    }
}

/// Render and persist the report
///
/// # Errors
/// `ReportWriteError::Io` when the destination cannot be written; the
/// in-memory report is untouched and remains available.
pub fn write_to_file(report: &RunReport, path: &Path) -> Result<(), ReportWriteError> {
    let rendered = render(report);
    std::fs::write(path, rendered).map_err(|source| ReportWriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
