//! JSON export of the analysis metrics

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    ClassifierConfig, ClassifierOutcome, Correlation, DistributionBucket, EvaluationResult, Grade,
    ScalerParams,
};

/// Metadata about the analysis run
#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the analysis (RFC 3339)
    pub timestamp: String,
    /// Markscope version
    pub markscope_version: String,
    pub seed: u64,
    pub trees: usize,
    /// Held-out fraction requested on the command line
    pub test_size: f64,
    pub split_strategy: String,
    pub records: usize,
    pub train_records: usize,
    pub test_records: usize,
}

/// Share of the class holding one grade
#[derive(Debug, Serialize)]
pub struct GradeShare {
    pub grade: Grade,
    pub count: usize,
    pub percentage: f64,
}

/// Prediction for one held-out student
#[derive(Debug, Serialize)]
pub struct PredictionEntry {
    pub student_id: u32,
    pub actual: Grade,
    pub predicted: Grade,
}

/// Complete metrics export
#[derive(Debug, Serialize)]
pub struct MetricsExport {
    pub metadata: ExportMetadata,
    pub distribution: Vec<DistributionBucket>,
    pub grades: Vec<GradeShare>,
    pub correlations: Vec<Correlation>,
    pub scaler: ScalerParams,
    pub evaluation: EvaluationResult,
    pub predictions: Vec<PredictionEntry>,
}

impl MetricsExport {
    /// Assemble the export, stamping it with the current time
    pub fn new(
        config: &ClassifierConfig,
        records: usize,
        distribution: &[DistributionBucket],
        grade_counts: &[(Grade, usize)],
        correlations: &[Correlation],
        outcome: &ClassifierOutcome,
    ) -> Self {
        let grades = grade_counts
            .iter()
            .map(|&(grade, count)| GradeShare {
                grade,
                count,
                percentage: if records == 0 {
                    0.0
                } else {
                    count as f64 / records as f64 * 100.0
                },
            })
            .collect();

        let predictions = outcome
            .test_ids
            .iter()
            .zip(outcome.y_test.iter().zip(&outcome.predictions))
            .map(|(&student_id, (&actual, &predicted))| PredictionEntry {
                student_id,
                actual,
                predicted,
            })
            .collect();

        Self {
            metadata: ExportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                markscope_version: env!("CARGO_PKG_VERSION").to_string(),
                seed: config.seed,
                trees: config.n_trees,
                test_size: config.test_size,
                split_strategy: config.split.to_string(),
                records,
                train_records: outcome.train_ids.len(),
                test_records: outcome.test_ids.len(),
            },
            distribution: distribution.to_vec(),
            grades,
            correlations: correlations.to_vec(),
            scaler: outcome.scaler.clone(),
            evaluation: outcome.evaluation.clone(),
            predictions,
        }
    }
}

/// Write the metrics export as pretty-printed JSON
///
/// # Arguments
/// * `output_path` - Path to write the JSON file
/// * `export` - Assembled metrics
pub fn export_metrics(output_path: &Path, export: &MetricsExport) -> Result<()> {
    let json =
        serde_json::to_string_pretty(export).context("Failed to serialize metrics to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write metrics to {}", output_path.display()))?;

    tracing::info!(path = %output_path.display(), "wrote metrics export");
    Ok(())
}
