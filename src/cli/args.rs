//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::pipeline::{AnalysisConfig, FactorGroup, RegressionConfig};

/// ipklens - Relate student survey factors to cumulative GPA (IPK)
#[derive(Parser, Debug)]
#[command(name = "ipklens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input workbook (xlsx, xls, xlsb or ods) with the transcript,
    /// course and survey sheets
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Factor group to analyse (repeatable). Defaults to all groups.
    #[arg(short, long = "group")]
    pub groups: Vec<String>,

    /// Cohort for the graduation status distribution.
    /// Defaults to the most recent cohort in the data.
    #[arg(long)]
    pub cohort: Option<i64>,

    /// Cohorts to include in the IPS trend (comma-separated). Defaults to all.
    #[arg(long, value_delimiter = ',')]
    pub trend_cohorts: Vec<i64>,

    /// JSON report path.
    /// Defaults to the input directory with an '_analysis.json' suffix
    /// (e.g., data.xlsx → data_analysis.json).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not write the JSON report
    #[arg(long, default_value = "false")]
    pub no_export: bool,

    /// Also write enrollment, student summary and master tables as CSV into this directory
    #[arg(long)]
    pub export_tables: Option<PathBuf>,

    /// Seed for the train/test shuffle
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Share of rows held out for regression evaluation, strictly between 0 and 1
    #[arg(long, default_value = "0.2", value_parser = validate_test_fraction)]
    pub test_fraction: f64,

    /// Skip the interactive group picker
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the configured factor groups and their factors
    Groups,
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Get the report path, deriving it from the input if not explicitly provided.
    /// Returns `None` when the report is disabled or there is no input.
    pub fn output_path(&self) -> Option<PathBuf> {
        if self.no_export {
            return None;
        }
        let input = self.input.as_ref()?;
        Some(self.output.clone().unwrap_or_else(|| {
            let parent = input.parent().unwrap_or_else(|| Path::new("."));
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}_analysis.json", stem))
        }))
    }

    pub fn regression_config(&self) -> RegressionConfig {
        RegressionConfig {
            test_fraction: self.test_fraction,
            seed: self.seed,
        }
    }

    pub fn trend_cohorts(&self) -> Option<&[i64]> {
        if self.trend_cohorts.is_empty() {
            None
        } else {
            Some(&self.trend_cohorts)
        }
    }

    /// Resolve `--group` names against the configuration, in argument order.
    /// An empty selection resolves to every configured group.
    pub fn selected_groups<'a>(&self, config: &'a AnalysisConfig) -> Result<Vec<&'a FactorGroup>> {
        if self.groups.is_empty() {
            return Ok(config.factor_groups.iter().collect());
        }

        let mut selected: Vec<&FactorGroup> = Vec::with_capacity(self.groups.len());
        for name in &self.groups {
            let Some(group) = config.group(name) else {
                bail!(
                    "Unknown factor group '{}'. Valid groups: {}",
                    name,
                    config.group_names().join("; ")
                );
            };
            if !selected.iter().any(|g| g.name == group.name) {
                selected.push(group);
            }
        }
        Ok(selected)
    }
}

/// Validator for test_fraction parameter
fn validate_test_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_fraction must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}
