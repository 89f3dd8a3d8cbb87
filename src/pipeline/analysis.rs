//! One complete analysis run over a loaded workbook

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{info, warn};

use super::aggregate::{
    aggregate_students, enrollment_records, summaries_to_dataframe, EnrollmentRecord,
    StudentSummary,
};
use super::config::{AnalysisConfig, FactorGroup};
use super::correlation::{run_correlation, CorrelationReport};
use super::descriptive::{
    cohort_counts, ips_trend, latest_cohort, mean_ipk_by_cohort, status_distribution,
    CohortCount, CohortMean, StatusShare, TrendPoint,
};
use super::error::{PipelineWarning, RegressionError};
use super::loader::{load_workbook, Workbook};
use super::merge::{merge_master, missing_factor_warning};
use super::regression::{run_regression, RegressionConfig, RegressionReport};
use super::survey::{encode_survey, EncodingReport};

/// Derived tables of one run. Every run starts from scratch; nothing is
/// shared between runs.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub config: AnalysisConfig,
    /// Enrollment sheet, normalized
    pub enrollment: DataFrame,
    /// Course sheet as loaded
    pub courses: DataFrame,
    pub records: Vec<EnrollmentRecord>,
    pub summaries: Vec<StudentSummary>,
    pub encoding: EncodingReport,
    /// Encoded survey joined with final IPK and IPS
    pub master: DataFrame,
    pub warnings: Vec<PipelineWarning>,
}

impl AnalysisRun {
    /// Load the workbook at `path` and build every derived table
    pub fn from_path(path: &Path, config: AnalysisConfig) -> Result<Self> {
        let workbook = load_workbook(path, &config.sheets)?;
        Self::from_workbook(workbook, config)
    }

    /// Build every derived table from already-loaded sheets
    pub fn from_workbook(workbook: Workbook, config: AnalysisConfig) -> Result<Self> {
        let Workbook {
            enrollment,
            courses,
            survey,
        } = workbook;

        let encoded = encode_survey(&survey, &config.survey).context("Failed to encode survey")?;
        let mut warnings = encoded.report.warnings();

        let records = enrollment_records(&enrollment).context("Failed to read enrollment rows")?;
        let summaries = aggregate_students(&records, &config.semesters);
        info!(
            records = records.len(),
            students = summaries.len(),
            "enrollment aggregated"
        );

        let merged = merge_master(&encoded.table, &summaries).context("Failed to build master table")?;
        if merged.duplicate_survey_rows > 0 {
            warnings.push(PipelineWarning::DuplicateSurveyRows {
                count: merged.duplicate_survey_rows,
            });
        }
        if let Some(missing) = missing_factor_warning(&merged.master, &config) {
            warnings.push(missing);
        }
        for warning in warnings
            .iter()
            .filter(|w| !matches!(w, PipelineWarning::UnrecognizedAnswers { .. }))
        {
            warn!("{}", warning);
        }

        Ok(Self {
            config,
            enrollment,
            courses,
            records,
            summaries,
            encoding: encoded.report,
            master: merged.master,
            warnings,
        })
    }

    /// Student summaries as a table, semester list joined with `,`
    pub fn summary_table(&self) -> PolarsResult<DataFrame> {
        summaries_to_dataframe(&self.summaries)
    }

    pub fn correlation(&self, group: &FactorGroup) -> Result<CorrelationReport> {
        run_correlation(&self.master, &group.factors, &group.name)
    }

    pub fn regression(
        &self,
        group: &FactorGroup,
        config: &RegressionConfig,
    ) -> Result<RegressionReport, RegressionError> {
        run_regression(&self.master, &group.factors, &group.name, config)
    }

    pub fn cohort_counts(&self) -> Vec<CohortCount> {
        cohort_counts(&self.summaries)
    }

    pub fn mean_ipk_by_cohort(&self) -> Vec<CohortMean> {
        mean_ipk_by_cohort(&self.summaries)
    }

    pub fn ips_trend(&self, cohorts: Option<&[i64]>) -> Vec<TrendPoint> {
        ips_trend(&self.records, &self.config.semesters, cohorts)
    }

    pub fn status_distribution(&self, cohort: i64) -> Vec<StatusShare> {
        status_distribution(&self.summaries, cohort)
    }

    pub fn latest_cohort(&self) -> Option<i64> {
        latest_cohort(&self.summaries)
    }
}
