//! Pearson correlation between snapshot columns

use polars::prelude::*;
use serde::Serialize;

use super::error::AnalysisError;

/// Correlation of one feature with a target column
#[derive(Debug, Clone, Serialize)]
pub struct Correlation {
    pub feature: String,
    pub target: String,
    pub coefficient: f64,
}

/// Pearson correlation between two numeric columns of a frame.
///
/// Both columns are cast to Float64 first. Rows where either value is null
/// are skipped. A constant column has no defined correlation and is an error.
pub fn pearson_correlation(df: &DataFrame, x: &str, y: &str) -> Result<f64, AnalysisError> {
    let cast = |name: &str| -> Result<Column, AnalysisError> {
        let column = df
            .column(name)
            .map_err(|_| AnalysisError::InvalidColumn(name.to_string()))?;
        if !column.dtype().is_primitive_numeric() {
            return Err(AnalysisError::InvalidColumn(name.to_string()));
        }
        Ok(column.cast(&DataType::Float64)?)
    };

    let col_x = cast(x)?;
    let col_y = cast(y)?;

    compute_pearson_correlation(&col_x, &col_y)?.ok_or_else(|| AnalysisError::ZeroVariance {
        x: x.to_string(),
        y: y.to_string(),
    })
}

/// Correlation of each feature with the `target` column, in the given order
pub fn correlations_with(
    df: &DataFrame,
    target: &str,
    features: &[&str],
) -> Result<Vec<Correlation>, AnalysisError> {
    features
        .iter()
        .map(|feature| {
            let coefficient = pearson_correlation(df, feature, target)?;
            tracing::debug!(feature, target, coefficient, "pearson correlation");
            Ok(Correlation {
                feature: feature.to_string(),
                target: target.to_string(),
                coefficient,
            })
        })
        .collect()
}

/// Compute Pearson correlation using Welford's algorithm
///
/// Single pass for numerical stability. Returns `Ok(None)` when either
/// column has zero variance or no complete pairs.
fn compute_pearson_correlation(s1: &Column, s2: &Column) -> Result<Option<f64>, AnalysisError> {
    let ca1 = s1.as_materialized_series().f64()?;
    let ca2 = s2.as_materialized_series().f64()?;

    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (x, y) in ca1.iter().zip(ca2.iter()) {
        if let (Some(x), Some(y)) = (x, y) {
            n += 1.0;
            let dx = x - mean_x;
            let dy = y - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (x - mean_x);
            var_y += dy * (y - mean_y);
            cov_xy += dx * (y - mean_y);
        }
    }

    if n == 0.0 || var_x <= 0.0 || var_y <= 0.0 {
        return Ok(None);
    }

    // Clamp rounding noise so perfectly collinear columns report exactly +/-1
    Ok(Some((cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)))
}
