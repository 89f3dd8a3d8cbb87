//! Join of the encoded survey with per-student GPA data

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

use super::aggregate::StudentSummary;
use super::columns::{has_column, string_values};
use super::config::{AnalysisConfig, IPK, IPS, NIM};
use super::error::PipelineWarning;

/// Result of building the master table
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub master: DataFrame,
    /// Survey rows dropped because their student ID appeared earlier
    pub duplicate_survey_rows: usize,
}

/// Inner-join the encoded survey with `{NIM, IPK, IPS}` of the summaries.
///
/// Duplicates resolve first-seen on both sides. Output rows keep survey
/// order; students missing from either side are excluded.
pub fn merge_master(survey: &DataFrame, summaries: &[StudentSummary]) -> Result<MergeOutcome> {
    let mut gpa: HashMap<&str, (Option<f64>, Option<f64>)> = HashMap::new();
    for summary in summaries {
        gpa.entry(summary.nim.as_str())
            .or_insert((summary.final_ipk, summary.final_ips));
    }

    let ids = string_values(survey.column(NIM)?)?;
    let mut seen: HashSet<&str> = HashSet::new();
    let mut keep: Vec<IdxSize> = Vec::new();
    let mut ipk: Vec<Option<f64>> = Vec::new();
    let mut ips: Vec<Option<f64>> = Vec::new();
    let mut duplicates = 0usize;

    for (row, id) in ids.iter().enumerate() {
        let Some(id) = id.as_deref() else {
            continue;
        };
        if !seen.insert(id) {
            duplicates += 1;
            continue;
        }
        if let Some((student_ipk, student_ips)) = gpa.get(id) {
            keep.push(row as IdxSize);
            ipk.push(*student_ipk);
            ips.push(*student_ips);
        }
    }

    if duplicates > 0 {
        debug!(duplicates, "duplicate survey rows dropped");
    }

    let indices = IdxCa::from_vec("idx".into(), keep);
    let mut master = survey.take(&indices)?;
    // A survey sheet may carry its own GPA columns; the transcript values win.
    if has_column(&master, IPK) {
        master = master.drop(IPK)?;
    }
    if has_column(&master, IPS) {
        master = master.drop(IPS)?;
    }
    master.with_column(Column::new(IPK.into(), ipk))?;
    master.with_column(Column::new(IPS.into(), ips))?;

    info!(
        survey_rows = survey.height(),
        students = summaries.len(),
        master_rows = master.height(),
        "master table built"
    );

    Ok(MergeOutcome {
        master,
        duplicate_survey_rows: duplicates,
    })
}

/// Configured factors that did not make it into the master table
pub fn missing_factor_warning(
    master: &DataFrame,
    config: &AnalysisConfig,
) -> Option<PipelineWarning> {
    let missing: Vec<String> = config
        .required_factors()
        .into_iter()
        .filter(|factor| !has_column(master, factor))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(PipelineWarning::MissingFactors { factors: missing })
    }
}
