//! Error and warning types for the analysis pipeline.
//!
//! Fatal conditions are split by failure domain: [`LoadError`] aborts the whole
//! run, [`RegressionError`] aborts a single regression. Non-fatal conditions are
//! collected as [`PipelineWarning`]s and travel with the run results.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors that abort loading the workbook.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The workbook path does not exist.
    #[error("Input file not found: {}", .path.display())]
    FileNotFound {
        /// Path supplied by the caller
        path: PathBuf,
    },

    /// The file exists but calamine could not open or decode it.
    #[error("Failed to open workbook {}: {source}", .path.display())]
    Workbook {
        /// Path supplied by the caller
        path: PathBuf,
        /// Underlying reader error
        #[source]
        source: calamine::Error,
    },

    /// A required sheet is not present in the workbook.
    #[error("Sheet '{sheet}' not found. Available sheets: {available:?}")]
    MissingSheet {
        /// Name of the required sheet
        sheet: String,
        /// Sheets that do exist, for the error message
        available: Vec<String>,
    },

    /// A sheet exists but could not be read into cells.
    #[error("Failed to read sheet '{sheet}': {source}")]
    SheetRead {
        /// Name of the sheet being read
        sheet: String,
        /// Underlying reader error
        #[source]
        source: calamine::Error,
    },

    /// A sheet has no header row.
    #[error("Sheet '{sheet}' is empty")]
    EmptySheet {
        /// Name of the empty sheet
        sheet: String,
    },

    /// A required column is absent from a sheet's header row.
    #[error("Column '{column}' not found in sheet '{sheet}'")]
    MissingColumn {
        /// Sheet that was searched
        sheet: String,
        /// Column that was required
        column: String,
    },

    /// A column holds a value that cannot be interpreted as its expected type.
    #[error("Invalid value '{value}' in column '{column}' of sheet '{sheet}' (row {row}): expected {expected}")]
    InvalidValue {
        /// Sheet containing the value
        sheet: String,
        /// Column containing the value
        column: String,
        /// Spreadsheet row number (the header is row 1)
        row: usize,
        /// Offending cell rendered as text
        value: String,
        /// Human readable description of the expected type
        expected: &'static str,
    },

    /// Building the in-memory table failed.
    #[error("Failed to build table for sheet '{sheet}': {source}")]
    Table {
        /// Sheet being converted
        sheet: String,
        /// Underlying polars error
        #[source]
        source: polars::error::PolarsError,
    },
}

/// Errors that abort a single regression run. Other groups and the correlation
/// pass are unaffected.
#[derive(Debug, Error)]
pub enum RegressionError {
    /// None of the requested factors exist in the master table.
    #[error("No factors of group '{group}' were found in the master table")]
    NoUsableFactors {
        /// Factor group label
        group: String,
    },

    /// Too few rows to produce both a training and a held-out partition.
    #[error("Group '{group}' has {rows} row(s), too few for a train/test split")]
    InsufficientRows {
        /// Factor group label
        group: String,
        /// Rows available in the master table
        rows: usize,
    },

    /// The master table lacks the IPK column.
    #[error("Master table has no IPK column")]
    MissingTarget,

    /// A column could not be read as numeric data.
    #[error("Failed to read column '{column}': {source}")]
    Column {
        /// Column being read
        column: String,
        /// Underlying polars error
        #[source]
        source: polars::error::PolarsError,
    },
}

/// Non-fatal conditions raised while building the master table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// Configured factors that are absent from the master table.
    MissingFactors {
        /// Factor identifiers, deduplicated, in configuration order
        factors: Vec<String>,
    },
    /// Survey answers that matched no category of their factor.
    UnrecognizedAnswers {
        /// Factor identifier
        factor: String,
        /// Number of rows with an unrecognized answer
        count: usize,
        /// Distinct unrecognized answers in first-seen order
        values: Vec<String>,
    },
    /// Survey rows dropped because their student ID was already seen.
    DuplicateSurveyRows {
        /// Number of rows dropped
        count: usize,
    },
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::MissingFactors { factors } => write!(
                f,
                "Survey factors not found in master table: {}. Correlation/regression will skip them.",
                factors.join(", ")
            ),
            PipelineWarning::UnrecognizedAnswers {
                factor,
                count,
                values,
            } => write!(
                f,
                "{} unrecognized answer(s) for '{}' treated as missing: {}",
                count,
                factor,
                values
                    .iter()
                    .map(|v| format!("\"{}\"", v))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            PipelineWarning::DuplicateSurveyRows { count } => write!(
                f,
                "{} duplicate survey row(s) dropped (first response per student kept)",
                count
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display() {
        let err = LoadError::MissingColumn {
            sheet: "Responden".to_string(),
            column: "NIM".to_string(),
        };
        assert_eq!(err.to_string(), "Column 'NIM' not found in sheet 'Responden'");
    }

    #[test]
    fn test_missing_sheet_display_lists_available() {
        let err = LoadError::MissingSheet {
            sheet: "MataKuliah".to_string(),
            available: vec!["Sheet1".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("MataKuliah"));
        assert!(msg.contains("Sheet1"));
    }

    #[test]
    fn test_no_usable_factors_names_group() {
        let err = RegressionError::NoUsableFactors {
            group: "Faktor Pilihan Studi".to_string(),
        };
        assert!(err.to_string().contains("Faktor Pilihan Studi"));
    }

    #[test]
    fn test_missing_factors_warning_display() {
        let warning = PipelineWarning::MissingFactors {
            factors: vec!["uang_saku".to_string(), "kepuasan_prodi".to_string()],
        };
        assert!(warning.to_string().contains("uang_saku, kepuasan_prodi"));
    }
}
