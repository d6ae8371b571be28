//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::path::PathBuf;

use markscope::pipeline::*;
use polars::prelude::*;
use tempfile::TempDir;

/// The fixed class with averages derived
pub fn derived_records() -> Vec<StudentRecord> {
    derive_averages(&student_records())
}

/// Look up a record by student name
pub fn record_named<'a>(records: &'a [StudentRecord], name: &str) -> &'a StudentRecord {
    records
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no student named {}", name))
}

/// Bucket label holding a student's average
pub fn bucket_of(record: &StudentRecord) -> &'static str {
    let average = record.average.expect("average derived");
    BUCKET_LABELS[bucket_index(average).expect("average in range")]
}

/// Snapshot frame for the derived class
pub fn snapshot_frame() -> DataFrame {
    build_snapshot_frame(&derived_records()).unwrap()
}

/// Temporary directory with a file path inside it
pub fn temp_path(file_name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(file_name);
    (temp_dir, path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Classifier that always predicts one grade and records what it was fitted on
#[derive(Debug, Default)]
pub struct ConstantClassifier {
    pub grade: Option<Grade>,
    pub fitted_rows: Vec<Vec<f64>>,
    pub fitted_labels: Vec<Grade>,
}

impl ConstantClassifier {
    pub fn predicting(grade: Grade) -> Self {
        Self {
            grade: Some(grade),
            ..Default::default()
        }
    }
}

impl Classifier for ConstantClassifier {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Grade]) -> Result<(), AnalysisError> {
        self.fitted_rows = features.rows().to_vec();
        self.fitted_labels = labels.to_vec();
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Grade>, AnalysisError> {
        let grade = self.grade.ok_or(AnalysisError::NotFitted)?;
        Ok(vec![grade; features.n_rows()])
    }
}

/// Scaler that passes data through and counts how often it is fitted
#[derive(Debug, Default)]
pub struct CountingScaler {
    pub fits: std::cell::Cell<usize>,
}

impl Scaler for CountingScaler {
    fn fit(&self, data: &FeatureMatrix) -> Result<ScalerParams, AnalysisError> {
        self.fits.set(self.fits.get() + 1);
        Ok(ScalerParams {
            means: vec![0.0; data.n_features()],
            stds: vec![1.0; data.n_features()],
        })
    }

    fn apply(
        &self,
        _params: &ScalerParams,
        data: &FeatureMatrix,
    ) -> Result<FeatureMatrix, AnalysisError> {
        Ok(data.clone())
    }
}
