//! JSON report and CSV table export

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{
    AnalysisRun, CohortCount, CohortMean, CorrelationReport, PipelineWarning, RegressionConfig,
    RegressionReport, StatusShare, TrendPoint,
};

use super::summary::RunSummary;

/// Metadata about the analysis run
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub ipklens_version: String,
    pub input_file: String,
    pub regression: RegressionConfig,
}

#[derive(Debug, Serialize)]
pub struct StatusBreakdown {
    pub cohort: i64,
    pub shares: Vec<StatusShare>,
}

#[derive(Debug, Serialize)]
pub struct DescriptiveSection {
    pub cohort_counts: Vec<CohortCount>,
    pub mean_ipk_by_cohort: Vec<CohortMean>,
    pub ips_trend: Vec<TrendPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_distribution: Option<StatusBreakdown>,
}

/// Regression outcome of one group; failed groups carry the error text
#[derive(Debug, Serialize)]
pub struct RegressionEntry {
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RegressionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete analysis report
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub summary: RunSummary,
    pub warnings: Vec<PipelineWarning>,
    pub descriptive: DescriptiveSection,
    pub correlation: Vec<CorrelationReport>,
    pub regression: Vec<RegressionEntry>,
}

impl AnalysisReport {
    pub fn new(
        run: &AnalysisRun,
        input: &Path,
        regression_config: RegressionConfig,
        descriptive: DescriptiveSection,
        correlation: Vec<CorrelationReport>,
        regression: Vec<RegressionEntry>,
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                ipklens_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input.display().to_string(),
                regression: regression_config,
            },
            summary: RunSummary::from_run(run),
            warnings: run.warnings.clone(),
            descriptive,
            correlation,
            regression,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn export_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize analysis report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis report to {}", output_path.display()))?;

    Ok(())
}

/// Write the enrollment, student summary and master tables as CSV files
/// into `dir`, creating it if needed. Returns the written paths.
pub fn export_tables(run: &AnalysisRun, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut summary = run
        .summary_table()
        .context("Failed to build student summary table")?;
    let mut enrollment = run.enrollment.clone();
    let mut master = run.master.clone();

    let mut written = Vec::with_capacity(3);
    for (name, df) in [
        ("enrollment.csv", &mut enrollment),
        ("student_summary.csv", &mut summary),
        ("master.csv", &mut master),
    ] {
        let path = dir.join(name);
        write_csv(df, &path)?;
        written.push(path);
    }
    Ok(written)
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .finish(df)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}
