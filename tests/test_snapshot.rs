//! Tests for snapshot export, reload and column correlations

use markscope::pipeline::*;
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn assert_round_trip(file_name: &str) {
    let (_temp_dir, path) = temp_path(file_name);
    let records = derived_records();
    let mut df = build_snapshot_frame(&records).unwrap();

    save_snapshot(&mut df, &path).unwrap();
    let loaded = load_snapshot(&path).unwrap();

    assert_shape(&loaded, 15, SNAPSHOT_COLUMNS.len());
    let names: Vec<String> = loaded
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, SNAPSHOT_COLUMNS.to_vec());

    assert_eq!(records_from_frame(&loaded).unwrap(), records);
}

#[test]
fn test_csv_round_trip() {
    assert_round_trip("snapshot.csv");
}

#[test]
fn test_parquet_round_trip() {
    assert_round_trip("snapshot.parquet");
}

#[test]
fn test_unsupported_extension_rejected() {
    let (_temp_dir, path) = temp_path("snapshot.xlsx");
    let mut df = snapshot_frame();

    let err = save_snapshot(&mut df, &path).unwrap_err();
    assert!(err.to_string().contains("Unsupported snapshot format"));
    assert!(!path.exists());
}

#[test]
fn test_snapshot_requires_averages() {
    assert!(matches!(
        build_snapshot_frame(&student_records()),
        Err(AnalysisError::MissingAverage(1))
    ));
}

#[test]
fn test_performance_correlations_are_strong() {
    let df = snapshot_frame();
    let correlations =
        correlations_with(&df, "average_marks", &["attendance", "study_hours"]).unwrap();

    assert_eq!(correlations.len(), 2);
    for c in &correlations {
        assert!(c.coefficient > 0.5, "{} = {}", c.feature, c.coefficient);
        assert!(c.coefficient <= 1.0);
    }
}

#[test]
fn test_correlation_is_symmetric() {
    let df = snapshot_frame();
    let xy = pearson_correlation(&df, "math", "english").unwrap();
    let yx = pearson_correlation(&df, "english", "math").unwrap();
    assert!((xy - yx).abs() < 1e-12);
}

#[test]
fn test_correlation_rejects_constant_and_text_columns() {
    let df = df! {
        "flat" => [3i64, 3, 3, 3],
        "rising" => [1i64, 2, 3, 4],
        "label" => ["a", "b", "c", "d"],
    }
    .unwrap();

    assert!(matches!(
        pearson_correlation(&df, "flat", "rising"),
        Err(AnalysisError::ZeroVariance { .. })
    ));
    assert!(matches!(
        pearson_correlation(&df, "label", "rising"),
        Err(AnalysisError::InvalidColumn(_))
    ));
    assert!(matches!(
        pearson_correlation(&df, "missing", "rising"),
        Err(AnalysisError::InvalidColumn(_))
    ));
}
