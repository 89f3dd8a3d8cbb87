//! Survey schema mapping: question columns to canonical factor columns

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::categories::Answer;
use super::columns::{float_values, has_column, string_values};
use super::config::SurveySchema;
use super::error::PipelineWarning;

/// Per-factor outcome counts for one mapped survey question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorEncoding {
    pub factor: String,
    pub coded: usize,
    pub missing: usize,
    pub unrecognized: usize,
    /// Distinct unrecognized answers, first-seen order
    pub unrecognized_values: Vec<String>,
}

impl FactorEncoding {
    fn new(factor: &str) -> Self {
        Self {
            factor: factor.to_string(),
            coded: 0,
            missing: 0,
            unrecognized: 0,
            unrecognized_values: Vec::new(),
        }
    }

    fn unrecognized(&mut self, text: String) {
        self.unrecognized += 1;
        if !self.unrecognized_values.contains(&text) {
            self.unrecognized_values.push(text);
        }
    }

    fn warn_if_unrecognized(&self) {
        if self.unrecognized > 0 {
            warn!(
                factor = %self.factor,
                count = self.unrecognized,
                "unrecognized survey answers treated as missing"
            );
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodingReport {
    /// Renamed questions coerced to numbers; `coded` counts parsed cells
    pub numeric: Vec<FactorEncoding>,
    pub encoded: Vec<FactorEncoding>,
    /// Factors whose source question was not in the sheet
    pub absent_sources: Vec<String>,
}

impl EncodingReport {
    pub fn warnings(&self) -> Vec<PipelineWarning> {
        self.numeric
            .iter()
            .chain(self.encoded.iter())
            .filter(|e| e.unrecognized > 0)
            .map(|e| PipelineWarning::UnrecognizedAnswers {
                factor: e.factor.clone(),
                count: e.unrecognized,
                values: e.unrecognized_values.clone(),
            })
            .collect()
    }
}

/// Survey table after mapping, with the report of what the encoders saw
#[derive(Debug, Clone)]
pub struct EncodedSurvey {
    pub table: DataFrame,
    pub report: EncodingReport,
}

/// Map question-text columns onto canonical factor columns.
///
/// Renamed questions keep their position and are coerced to Float64; text that
/// is not a number becomes null and is counted as unrecognized. Encoded
/// questions are appended as Int32 code columns and their source question
/// columns are dropped. Questions missing
/// from the sheet are skipped silently.
pub fn encode_survey(survey: &DataFrame, schema: &SurveySchema) -> Result<EncodedSurvey> {
    let mut df = survey.clone();
    let mut report = EncodingReport::default();

    for renamed in &schema.renamed {
        if !has_column(&df, &renamed.question) {
            debug!(factor = %renamed.factor, "survey question not present");
            report.absent_sources.push(renamed.factor.clone());
            continue;
        }
        let column = df.column(&renamed.question)?;
        let raw = string_values(column)
            .with_context(|| format!("Failed to read survey column '{}'", renamed.question))?;
        let values = float_values(column)
            .with_context(|| format!("Failed to read survey column '{}'", renamed.question))?;

        let mut outcome = FactorEncoding::new(&renamed.factor);
        for (text, value) in raw.iter().zip(values.iter()) {
            match (text.as_deref(), value) {
                (_, Some(_)) => outcome.coded += 1,
                (None | Some(""), None) => outcome.missing += 1,
                (Some(text), None) => outcome.unrecognized(text.to_string()),
            }
        }
        outcome.warn_if_unrecognized();

        df.rename(&renamed.question, renamed.factor.as_str().into())?;
        df.with_column(Column::new(renamed.factor.as_str().into(), values))?;
        report.numeric.push(outcome);
    }

    let mut sources: Vec<&str> = Vec::new();
    for encoded in &schema.encoded {
        if !has_column(&df, &encoded.question) {
            debug!(factor = %encoded.factor, "survey question not present");
            report.absent_sources.push(encoded.factor.clone());
            continue;
        }

        let raw = string_values(df.column(&encoded.question)?)
            .with_context(|| format!("Failed to read survey column '{}'", encoded.question))?;

        let mut outcome = FactorEncoding::new(&encoded.factor);

        let codes: Vec<Option<i32>> = raw
            .iter()
            .map(|cell| match encoded.kind.encode(cell.as_deref()) {
                Answer::Coded(code) => {
                    outcome.coded += 1;
                    Some(code)
                }
                Answer::Missing => {
                    outcome.missing += 1;
                    None
                }
                Answer::Unrecognized(text) => {
                    outcome.unrecognized(text);
                    None
                }
            })
            .collect();

        outcome.warn_if_unrecognized();

        df.with_column(Column::new(encoded.factor.as_str().into(), codes))?;
        sources.push(encoded.question.as_str());
        report.encoded.push(outcome);
    }

    let df = df.drop_many(sources);

    Ok(EncodedSurvey { table: df, report })
}
