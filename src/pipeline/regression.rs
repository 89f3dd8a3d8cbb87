//! Multiple linear regression of survey factors against IPK

use faer::Mat;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use super::columns::{float_values, has_column};
use super::config::IPK;
use super::error::RegressionError;

/// Singular values below this fraction of the largest are treated as zero
const SINGULAR_VALUE_CUTOFF: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionConfig {
    /// Share of rows held out for evaluation, in (0, 1)
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded generator and hold out the first
/// `ceil(n * test_fraction)` indices.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> TrainTestSplit {
    let n_test = ((n as f64) * test_fraction).ceil().max(0.0) as usize;
    let n_test = n_test.min(n);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    TrainTestSplit {
        train,
        test: indices,
    }
}

/// Fitted linear model
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub intercept: f64,
    /// One coefficient per predictor column; constant predictors get 0.0
    pub coefficients: Vec<f64>,
}

impl OlsFit {
    /// Prediction for row `row` of column-major predictors
    pub fn predict(&self, columns: &[Vec<f64>], row: usize) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(columns.iter())
                .map(|(beta, col)| beta * col[row])
                .sum::<f64>()
    }
}

/// Ordinary least squares with intercept.
///
/// `columns` holds one vector per predictor, each the same length as `y`.
/// The centered problem is solved through a thin SVD pseudo-inverse, so
/// collinear predictors share the minimum-norm solution instead of one of
/// them being dropped. Constant predictors are left out and get 0.0.
pub fn fit_ols(columns: &[Vec<f64>], y: &[f64]) -> OlsFit {
    let n = y.len();
    let mut coefficients = vec![0.0; columns.len()];
    if n == 0 {
        return OlsFit {
            intercept: 0.0,
            coefficients,
        };
    }

    let means: Vec<f64> = columns.iter().map(|c| mean(c)).collect();
    let y_mean = mean(y);

    let varying: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, col)| col.iter().any(|&v| v != col[0]))
        .map(|(j, _)| j)
        .collect();
    if varying.len() < columns.len() {
        debug!(
            constant = columns.len() - varying.len(),
            "constant predictors left out of the fit"
        );
    }

    if !varying.is_empty() {
        let x = Mat::<f64>::from_fn(n, varying.len(), |i, k| {
            columns[varying[k]][i] - means[varying[k]]
        });
        let svd = x.thin_svd();
        let (u, s, v) = (svd.u(), svd.s_diagonal(), svd.v());

        let s_max = (0..s.nrows()).map(|k| s[k]).fold(0.0, f64::max);
        let cutoff = SINGULAR_VALUE_CUTOFF * s_max;
        for k in 0..s.nrows() {
            let sigma = s[k];
            if sigma <= cutoff {
                debug!(direction = k, "rank-deficient direction dropped");
                continue;
            }
            let weight = (0..n)
                .map(|i| u[(i, k)] * (y[i] - y_mean))
                .sum::<f64>()
                / sigma;
            for (col, &j) in varying.iter().enumerate() {
                coefficients[j] += v[(col, k)] * weight;
            }
        }
    }

    let intercept = y_mean
        - coefficients
            .iter()
            .zip(means.iter())
            .map(|(beta, mean)| beta * mean)
            .sum::<f64>();

    OlsFit {
        intercept,
        coefficients,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Error metrics on the held-out partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Not clamped; negative when the model is worse than the mean
    pub r2: f64,
}

/// MAE, MSE, RMSE and R² of `y_pred` against `y_true`.
///
/// R² is NaN for a single observation. With constant `y_true` it is 1.0 for
/// a perfect prediction and 0.0 otherwise.
pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return RegressionMetrics {
            mae: f64::NAN,
            mse: f64::NAN,
            rmse: f64::NAN,
            r2: f64::NAN,
        };
    }

    let (mut abs_sum, mut ss_res) = (0.0, 0.0);
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let err = t - p;
        abs_sum += err.abs();
        ss_res += err * err;
    }
    let mae = abs_sum / n as f64;
    let mse = ss_res / n as f64;

    let r2 = if n < 2 {
        f64::NAN
    } else {
        let y_mean = mean(&y_true[..n]);
        let ss_tot: f64 = y_true[..n].iter().map(|t| (t - y_mean).powi(2)).sum();
        if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        }
    };

    RegressionMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        r2,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorCoefficient {
    pub factor: String,
    pub coefficient: f64,
}

/// Regression results for one factor group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionReport {
    pub group: String,
    pub coefficients: Vec<FactorCoefficient>,
    #[serde(skip)]
    pub intercept: f64,
    /// Requested factors absent from the master table
    pub skipped: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub metrics: RegressionMetrics,
}

/// Fit IPK on the factors of one group and score the held-out rows.
///
/// Nulls are filled with the column mean (0.0 for an all-null column).
pub fn run_regression(
    master: &DataFrame,
    factors: &[String],
    group: &str,
    config: &RegressionConfig,
) -> Result<RegressionReport, RegressionError> {
    let (present, skipped): (Vec<&String>, Vec<&String>) =
        factors.iter().partition(|f| has_column(master, f));
    if present.is_empty() {
        return Err(RegressionError::NoUsableFactors {
            group: group.to_string(),
        });
    }
    if !has_column(master, IPK) {
        return Err(RegressionError::MissingTarget);
    }

    let columns = present
        .iter()
        .map(|f| filled_column(master, f))
        .collect::<Result<Vec<_>, _>>()?;
    let y = filled_column(master, IPK)?;

    let n = master.height();
    let split = train_test_split(n, config.test_fraction, config.seed);
    if split.train.is_empty() || split.test.is_empty() {
        return Err(RegressionError::InsufficientRows {
            group: group.to_string(),
            rows: n,
        });
    }

    let train_x: Vec<Vec<f64>> = columns.iter().map(|c| pick(c, &split.train)).collect();
    let test_x: Vec<Vec<f64>> = columns.iter().map(|c| pick(c, &split.test)).collect();
    let train_y = pick(&y, &split.train);
    let test_y = pick(&y, &split.test);

    let fit = fit_ols(&train_x, &train_y);
    let predictions: Vec<f64> = (0..test_y.len())
        .map(|row| fit.predict(&test_x, row))
        .collect();
    let metrics = evaluate(&test_y, &predictions);

    info!(
        group,
        factors = present.len(),
        n_train = split.train.len(),
        n_test = split.test.len(),
        r2 = metrics.r2,
        "regression fitted"
    );

    Ok(RegressionReport {
        group: group.to_string(),
        coefficients: present
            .iter()
            .zip(fit.coefficients.iter())
            .map(|(factor, &coefficient)| FactorCoefficient {
                factor: (*factor).clone(),
                coefficient,
            })
            .collect(),
        intercept: fit.intercept,
        skipped: skipped.into_iter().cloned().collect(),
        n_train: split.train.len(),
        n_test: split.test.len(),
        metrics,
    })
}

fn pick(values: &[f64], rows: &[usize]) -> Vec<f64> {
    rows.iter().map(|&i| values[i]).collect()
}

fn filled_column(master: &DataFrame, name: &str) -> Result<Vec<f64>, RegressionError> {
    let values = master
        .column(name)
        .and_then(float_values)
        .map_err(|source| RegressionError::Column {
            column: name.to_string(),
            source,
        })?;

    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let fill = mean(&present);
    Ok(values.into_iter().map(|v| v.unwrap_or(fill)).collect())
}
