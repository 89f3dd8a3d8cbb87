//! Spearman rank correlation of survey factors against IPK

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use super::columns::{float_values, has_column};
use super::config::IPK;

/// Significance level for the two-sided test
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Strength of a monotone relationship, bucketed by |rho|
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Strength {
    Negligible,
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn from_rho(rho: f64) -> Self {
        let abs = rho.abs();
        if abs >= 0.81 {
            Strength::VeryStrong
        } else if abs >= 0.61 {
            Strength::Strong
        } else if abs >= 0.41 {
            Strength::Moderate
        } else if abs >= 0.21 {
            Strength::Weak
        } else if abs >= 0.01 {
            Strength::VeryWeak
        } else {
            Strength::Negligible
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strength::VeryStrong => "Very Strong",
            Strength::Strong => "Strong",
            Strength::Moderate => "Moderate",
            Strength::Weak => "Weak",
            Strength::VeryWeak => "Very Weak",
            Strength::Negligible => "None/Negligible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Positive,
    Negative,
    None,
}

impl Direction {
    pub fn from_rho(rho: f64) -> Self {
        if rho > 0.0 {
            Direction::Positive
        } else if rho < 0.0 {
            Direction::Negative
        } else {
            Direction::None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Positive => "Positive (+)",
            Direction::Negative => "Negative (-)",
            Direction::None => "None",
        }
    }
}

/// Result of testing one factor.
///
/// `n` is the number of complete (factor, IPK) pairs in every variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    Computed { rho: f64, p_value: f64, n: usize },
    /// Fewer than 2 complete pairs
    InsufficientData { n: usize },
    /// One side has zero variance
    Undefined { n: usize },
}

impl CorrelationOutcome {
    pub fn n(&self) -> usize {
        match *self {
            CorrelationOutcome::Computed { n, .. }
            | CorrelationOutcome::InsufficientData { n }
            | CorrelationOutcome::Undefined { n } => n,
        }
    }

    pub fn rho(&self) -> Option<f64> {
        match *self {
            CorrelationOutcome::Computed { rho, .. } => Some(rho),
            _ => None,
        }
    }

    pub fn p_value(&self) -> Option<f64> {
        match *self {
            CorrelationOutcome::Computed { p_value, .. } => Some(p_value),
            _ => None,
        }
    }

    pub fn strength(&self) -> Option<Strength> {
        self.rho().map(Strength::from_rho)
    }

    pub fn direction(&self) -> Option<Direction> {
        self.rho().map(Direction::from_rho)
    }

    /// A NaN p-value (two pairs) is never significant
    pub fn is_significant(&self) -> bool {
        self.p_value().is_some_and(|p| p <= SIGNIFICANCE_LEVEL)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorCorrelation {
    pub factor: String,
    #[serde(flatten)]
    pub outcome: CorrelationOutcome,
}

/// Correlation results for one factor group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub group: String,
    pub rows: Vec<FactorCorrelation>,
    /// Requested factors absent from the master table
    pub skipped: Vec<String>,
}

/// Correlate each factor present in `master` with IPK, in input order.
pub fn run_correlation(
    master: &DataFrame,
    factors: &[String],
    group: &str,
) -> Result<CorrelationReport> {
    let ipk = float_values(master.column(IPK)?)?;
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for factor in factors {
        if !has_column(master, factor) {
            skipped.push(factor.clone());
            continue;
        }
        let values = float_values(master.column(factor)?)?;
        let outcome = correlate(&values, &ipk);
        debug!(group, factor = %factor, ?outcome, "correlation computed");
        rows.push(FactorCorrelation {
            factor: factor.clone(),
            outcome,
        });
    }

    Ok(CorrelationReport {
        group: group.to_string(),
        rows,
        skipped,
    })
}

/// Spearman correlation with pairwise deletion of incomplete rows
pub fn correlate(x: &[Option<f64>], y: &[Option<f64>]) -> CorrelationOutcome {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .unzip();
    spearman(&xs, &ys)
}

/// Spearman rho of two complete, equal-length samples
pub fn spearman(x: &[f64], y: &[f64]) -> CorrelationOutcome {
    let n = x.len().min(y.len());
    if n < 2 {
        return CorrelationOutcome::InsufficientData { n };
    }

    let rx = rank_data(&x[..n]);
    let ry = rank_data(&y[..n]);
    let Some(rho) = pearson(&rx, &ry) else {
        return CorrelationOutcome::Undefined { n };
    };
    let rho = rho.clamp(-1.0, 1.0);

    CorrelationOutcome::Computed {
        rho,
        p_value: p_value(rho, n),
        n,
    }
}

/// 1-based ranks; ties share the mean of the ranks they span
pub fn rank_data(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // positions i..j hold ranks i+1..=j
        let rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        i = j;
    }
    ranks
}

/// Pearson correlation via single-pass Welford updates.
///
/// Returns `None` when either sample has zero variance.
fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let mut count = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (&x, &y) in x.iter().zip(y.iter()) {
        count += 1.0;
        let dx = x - mean_x;
        let dy = y - mean_y;
        mean_x += dx / count;
        mean_y += dy / count;
        var_x += dx * (x - mean_x);
        var_y += dy * (y - mean_y);
        cov_xy += dx * (y - mean_y);
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some(cov_xy / (var_x * var_y).sqrt())
}

/// Two-sided p-value from Student's t with n-2 degrees of freedom
fn p_value(rho: f64, n: usize) -> f64 {
    if n <= 2 {
        return f64::NAN;
    }
    let denom = 1.0 - rho * rho;
    if denom <= f64::EPSILON {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t = rho * (df / denom).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}
