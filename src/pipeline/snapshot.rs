//! Augmented dataset snapshot - polars frame export and reload

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use super::dataset::{Grade, StudentRecord};
use super::error::AnalysisError;

/// Snapshot column names, in file order
pub const SNAPSHOT_COLUMNS: [&str; 9] = [
    "student_id",
    "name",
    "math",
    "science",
    "english",
    "attendance",
    "study_hours",
    "grade",
    "average_marks",
];

/// Build the augmented dataset frame (original fields, id and average).
///
/// Every record must already carry its derived average.
pub fn build_snapshot_frame(records: &[StudentRecord]) -> Result<DataFrame, AnalysisError> {
    let averages = records
        .iter()
        .map(StudentRecord::require_average)
        .collect::<Result<Vec<f64>, _>>()?;

    let ints = |f: fn(&StudentRecord) -> i64| records.iter().map(f).collect::<Vec<i64>>();

    let df = df! {
        "student_id" => ints(|r| r.id as i64),
        "name" => records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        "math" => ints(|r| r.math as i64),
        "science" => ints(|r| r.science as i64),
        "english" => ints(|r| r.english as i64),
        "attendance" => ints(|r| r.attendance as i64),
        "study_hours" => ints(|r| r.study_hours as i64),
        "grade" => records.iter().map(|r| r.grade.as_str()).collect::<Vec<_>>(),
        "average_marks" => averages,
    }?;

    Ok(df)
}

/// Save the snapshot to file (CSV or Parquet based on extension)
pub fn save_snapshot(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create snapshot file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create snapshot file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported snapshot format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    tracing::info!(path = %path.display(), rows = df.height(), "wrote snapshot");
    Ok(())
}

/// Load a previously written snapshot (CSV or Parquet based on extension)
pub fn load_snapshot(path: &Path) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported snapshot format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))
}

/// Rebuild records from a snapshot frame
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<StudentRecord>, AnalysisError> {
    let ids = int_column(df, "student_id")?;
    let math = int_column(df, "math")?;
    let science = int_column(df, "science")?;
    let english = int_column(df, "english")?;
    let attendance = int_column(df, "attendance")?;
    let study_hours = int_column(df, "study_hours")?;
    let names = str_column(df, "name")?;
    let grades = str_column(df, "grade")?;

    let average_col = df
        .column("average_marks")?
        .cast(&DataType::Float64)?;
    let averages: Vec<Option<f64>> = average_col
        .as_materialized_series()
        .f64()?
        .iter()
        .collect();

    let to_u8 = |column: &str, value: i64| {
        u8::try_from(value).map_err(|_| AnalysisError::InvalidColumn(column.to_string()))
    };

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let grade = grades[i]
            .parse::<Grade>()
            .map_err(|_| AnalysisError::InvalidColumn("grade".to_string()))?;
        let id = u32::try_from(ids[i])
            .map_err(|_| AnalysisError::InvalidColumn("student_id".to_string()))?;

        records.push(StudentRecord {
            id,
            name: names[i].clone(),
            math: to_u8("math", math[i])?,
            science: to_u8("science", science[i])?,
            english: to_u8("english", english[i])?,
            attendance: to_u8("attendance", attendance[i])?,
            study_hours: to_u8("study_hours", study_hours[i])?,
            grade,
            average: averages[i],
        });
    }

    Ok(records)
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<i64>, AnalysisError> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    column
        .as_materialized_series()
        .i64()?
        .iter()
        .map(|v| v.ok_or_else(|| AnalysisError::InvalidColumn(name.to_string())))
        .collect()
}

fn str_column(df: &DataFrame, name: &str) -> Result<Vec<String>, AnalysisError> {
    let column = df.column(name)?;
    column
        .as_materialized_series()
        .str()?
        .iter()
        .map(|v| {
            v.map(str::to_string)
                .ok_or_else(|| AnalysisError::InvalidColumn(name.to_string()))
        })
        .collect()
}
