// crates/object-contract-core/src/report.rs
// ============================================================================
// Module: Suite Report Artifacts
// Description: Writes run summaries to disk.
// Purpose: Persist a canonical JSON summary and a readable markdown summary.
// Dependencies: serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! Renders a [`SuiteReport`] as `summary.json` (RFC 8785 canonical JSON) and
//! `summary.md` under a caller-chosen directory, creating it when missing.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::runner::SuiteReport;

/// Canonical JSON summary filename.
pub const SUMMARY_JSON: &str = "summary.json";
/// Markdown summary filename.
pub const SUMMARY_MARKDOWN: &str = "summary.md";

/// Failure writing report artifacts.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem failure.
    #[error("report io error: {0}")]
    Io(#[from] std::io::Error),
    /// Canonical serialization failure.
    #[error("report serialization failed: {0}")]
    Serialize(String),
}

/// Writes `summary.json` (RFC 8785 canonical JSON) and `summary.md` into
/// `dir`, creating it if needed. Returns the written paths.
///
/// # Errors
///
/// Returns [`ReportError`] when the directory or files cannot be written.
pub fn write_suite_report(dir: &Path, report: &SuiteReport) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(dir)?;
    let json_path = dir.join(SUMMARY_JSON);
    let bytes = serde_jcs::to_vec(report).map_err(|err| ReportError::Serialize(err.to_string()))?;
    fs::write(&json_path, bytes)?;
    let markdown_path = dir.join(SUMMARY_MARKDOWN);
    fs::write(&markdown_path, summary_markdown(report).as_bytes())?;
    Ok(vec![json_path, markdown_path])
}

/// Renders the markdown summary.
#[must_use]
pub fn summary_markdown(report: &SuiteReport) -> String {
    let mut out = String::new();
    out.push_str("# Object Contract Summary\n\n");
    out.push_str("## Totals\n\n");
    out.push_str(&format!("- Passed: {}\n", report.passed()));
    out.push_str(&format!("- Failed: {}\n", report.failed()));
    out.push_str(&format!("- Errored: {}\n", report.errored()));
    out.push_str("\n## Cases\n\n");
    if report.cases.is_empty() {
        out.push_str("- None\n");
    }
    for case in &report.cases {
        match case.outcome.detail() {
            Some(detail) => out.push_str(&format!(
                "- {} ({} ms): {}: {}\n",
                case.case,
                case.duration_ms,
                case.outcome.label(),
                detail
            )),
            None => out.push_str(&format!(
                "- {} ({} ms): {}\n",
                case.case,
                case.duration_ms,
                case.outcome.label()
            )),
        }
    }
    out
}
