//! Display rows and terminal tables for engine results

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{
    CohortCount, CohortMean, CorrelationOutcome, CorrelationReport, FactorCorrelation,
    RegressionReport, StatusShare, TrendPoint,
};

const NOT_AVAILABLE: &str = "N/A";

/// One correlation result formatted for presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationRow {
    pub factor: String,
    pub rho: String,
    pub p_value: String,
    pub strength: String,
    pub direction: String,
    pub significance: String,
}

impl From<&FactorCorrelation> for CorrelationRow {
    fn from(result: &FactorCorrelation) -> Self {
        let sentinel = |significance: &str| CorrelationRow {
            factor: result.factor.clone(),
            rho: NOT_AVAILABLE.to_string(),
            p_value: NOT_AVAILABLE.to_string(),
            strength: NOT_AVAILABLE.to_string(),
            direction: NOT_AVAILABLE.to_string(),
            significance: significance.to_string(),
        };

        match result.outcome {
            CorrelationOutcome::InsufficientData { .. } => sentinel("Insufficient data"),
            CorrelationOutcome::Undefined { .. } => sentinel("Undefined"),
            CorrelationOutcome::Computed { rho, p_value, .. } => CorrelationRow {
                factor: result.factor.clone(),
                rho: format!("{:.4}", rho),
                p_value: format!("{:.4}", p_value),
                strength: result
                    .outcome
                    .strength()
                    .map_or(NOT_AVAILABLE, |s| s.label())
                    .to_string(),
                direction: result
                    .outcome
                    .direction()
                    .map_or(NOT_AVAILABLE, |d| d.label())
                    .to_string(),
                significance: if result.outcome.is_significant() {
                    "Significant (p<=0.05)".to_string()
                } else {
                    "Not significant (p>0.05)".to_string()
                },
            },
        }
    }
}

pub fn correlation_rows(report: &CorrelationReport) -> Vec<CorrelationRow> {
    report.rows.iter().map(CorrelationRow::from).collect()
}

/// `(factor, coefficient)` pairs to 4 decimals; the intercept is omitted
pub fn coefficient_rows(report: &RegressionReport) -> Vec<(String, String)> {
    report
        .coefficients
        .iter()
        .map(|c| (c.factor.clone(), format!("{:.4}", c.coefficient)))
        .collect()
}

/// `(metric, value)` pairs to 4 decimals
pub fn metric_rows(report: &RegressionReport) -> Vec<(&'static str, String)> {
    let m = &report.metrics;
    vec![
        ("MAE", format!("{:.4}", m.mae)),
        ("MSE", format!("{:.4}", m.mse)),
        ("RMSE", format!("{:.4}", m.rmse)),
        ("R²", format!("{:.4}", m.r2)),
    ]
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(titles));
    table
}

pub fn correlation_table(report: &CorrelationReport) -> Table {
    let mut table = new_table(&[
        "Factor",
        "Rho",
        "P-value",
        "Strength",
        "Direction",
        "Significance",
    ]);
    for (row, result) in correlation_rows(report).into_iter().zip(report.rows.iter()) {
        let significance = if result.outcome.is_significant() {
            Cell::new(&row.significance).fg(Color::Green)
        } else if result.outcome.rho().is_none() {
            Cell::new(&row.significance).fg(Color::Yellow)
        } else {
            Cell::new(&row.significance)
        };
        table.add_row(vec![
            Cell::new(&row.factor),
            Cell::new(&row.rho),
            Cell::new(&row.p_value),
            Cell::new(&row.strength),
            Cell::new(&row.direction),
            significance,
        ]);
    }
    table
}

pub fn coefficient_table(report: &RegressionReport) -> Table {
    let mut table = new_table(&["Factor", "Effect on IPK"]);
    for (factor, coefficient) in coefficient_rows(report) {
        table.add_row(vec![Cell::new(factor), Cell::new(coefficient)]);
    }
    table
}

pub fn metric_table(report: &RegressionReport) -> Table {
    let mut table = new_table(&["Metric", "Value"]);
    for (metric, value) in metric_rows(report) {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }
    table
}

pub fn cohort_table(counts: &[CohortCount], means: &[CohortMean]) -> Table {
    let mut table = new_table(&["Cohort", "Students", "Mean IPK"]);
    for count in counts {
        let mean = means
            .iter()
            .find(|m| m.cohort == count.cohort)
            .map_or(NOT_AVAILABLE.to_string(), |m| format!("{:.2}", m.mean_ipk));
        table.add_row(vec![
            Cell::new(count.cohort),
            Cell::new(count.students),
            Cell::new(mean),
        ]);
    }
    table
}

pub fn trend_table(points: &[TrendPoint]) -> Table {
    let mut table = new_table(&["Semester", "Cohort", "Mean IPS", "Rows"]);
    for point in points {
        table.add_row(vec![
            Cell::new(&point.semester),
            Cell::new(point.cohort),
            Cell::new(format!("{:.2}", point.mean_ips)),
            Cell::new(point.rows),
        ]);
    }
    table
}

pub fn status_table(shares: &[StatusShare]) -> Table {
    let mut table = new_table(&["Status", "Students", "Share"]);
    for share in shares {
        table.add_row(vec![
            Cell::new(share.status.label()),
            Cell::new(share.count),
            Cell::new(format!("{:.1}%", share.share * 100.0)),
        ]);
    }
    table
}

/// Print a titled, indented table
pub fn print_table(title: &str, table: &Table) {
    println!();
    println!("    {}", style(title).white().bold());
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
