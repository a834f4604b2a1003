//! Report output
//!
//! Writes `graph.json`, `report.json` and a one-line-per-rule `report.txt`
//! into an output directory.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::graph::Graph;
use crate::rules::RuleReport;
use crate::verify::RuleResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Files produced by [`write_reports`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub graph: PathBuf,
    pub report: PathBuf,
    pub summary: PathBuf,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    results: &'a [RuleResult],
}

/// `[PASS] function @ region: detail`
pub fn format_result_line(result: &RuleResult) -> String {
    let status = if result.status { "PASS" } else { "FAIL" };
    format!(
        "[{}] {} @ {}: {}",
        status,
        result.function_name(),
        result.region,
        result.detail
    )
}

pub fn format_summary(report: &RuleReport) -> String {
    report
        .results
        .iter()
        .map(format_result_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn write_reports(
    graph: &Graph,
    report: &RuleReport,
    out_dir: &Path,
) -> Result<ReportPaths, ReportError> {
    std::fs::create_dir_all(out_dir)?;

    let paths = ReportPaths {
        graph: out_dir.join("graph.json"),
        report: out_dir.join("report.json"),
        summary: out_dir.join("report.txt"),
    };

    std::fs::write(&paths.graph, serde_json::to_string_pretty(graph)?)?;

    let document = ReportDocument {
        generated_at: Utc::now(),
        results: &report.results,
    };
    std::fs::write(&paths.report, serde_json::to_string_pretty(&document)?)?;
    std::fs::write(&paths.summary, format_summary(report))?;

    tracing::info!("Reports written to {}", out_dir.display());
    Ok(paths)
}
