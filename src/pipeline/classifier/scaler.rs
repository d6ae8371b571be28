//! Feature standardisation

use serde::Serialize;

use super::FeatureMatrix;
use crate::pipeline::error::AnalysisError;

/// Fitted per-column statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalerParams {
    pub means: Vec<f64>,
    /// Population standard deviation per column
    pub stds: Vec<f64>,
}

/// A transform fitted once and then applied unchanged
pub trait Scaler {
    /// Learn parameters from `data`
    fn fit(&self, data: &FeatureMatrix) -> Result<ScalerParams, AnalysisError>;

    /// Transform `data` with previously fitted parameters
    fn apply(&self, params: &ScalerParams, data: &FeatureMatrix)
        -> Result<FeatureMatrix, AnalysisError>;
}

/// Zero mean, unit variance per column.
///
/// A constant column keeps a scale of 1.0 so it maps to all zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl Scaler for StandardScaler {
    fn fit(&self, data: &FeatureMatrix) -> Result<ScalerParams, AnalysisError> {
        if data.is_empty() {
            return Err(AnalysisError::EmptyTrainingSet);
        }

        let n = data.n_rows() as f64;
        let mut means = Vec::with_capacity(data.n_features());
        let mut stds = Vec::with_capacity(data.n_features());

        for j in 0..data.n_features() {
            let column = data.column(j);
            let mean = column.iter().sum::<f64>() / n;
            let variance = column.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            means.push(mean);
            stds.push(variance.sqrt());
        }

        Ok(ScalerParams { means, stds })
    }

    fn apply(
        &self,
        params: &ScalerParams,
        data: &FeatureMatrix,
    ) -> Result<FeatureMatrix, AnalysisError> {
        if params.means.len() != data.n_features() || params.stds.len() != data.n_features() {
            return Err(AnalysisError::FeatureCountMismatch {
                expected: params.means.len(),
                actual: data.n_features(),
            });
        }

        let rows = data
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(params.means.iter().zip(&params.stds))
                    .map(|(x, (mean, std))| {
                        let scale = if *std > f64::EPSILON { *std } else { 1.0 };
                        (x - mean) / scale
                    })
                    .collect()
            })
            .collect();

        FeatureMatrix::new(data.feature_names().to_vec(), rows)
    }
}
