//! Marks distribution analysis
//!
//! Buckets the derived average into seven fixed right-closed ranges and
//! computes the simple aggregates (subject means, grade counts) consumed by
//! the charts and the report.

use serde::Serialize;

use super::dataset::{Grade, StudentRecord};
use super::error::AnalysisError;

/// Bucket boundaries for average marks
pub const BUCKET_BOUNDARIES: [f64; 8] = [0.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];

/// Display label for each bucket, aligned with `BUCKET_BOUNDARIES` windows
pub const BUCKET_LABELS: [&str; 7] = ["0-40", "41-50", "51-60", "61-70", "71-80", "81-90", "91-100"];

/// Subject columns in display order
pub const SUBJECTS: [&str; 3] = ["math", "science", "english"];

/// A labeled score range with its share of the dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub label: String,
    /// Lower bound (exclusive, except for the first bucket)
    pub lower: f64,
    /// Upper bound (inclusive)
    pub upper: f64,
    pub count: usize,
    /// Share of all records, in percent
    pub percentage: f64,
}

/// Index of the bucket holding `value`.
///
/// Intervals are right-closed: bucket `i` covers `(b[i], b[i+1]]`, and the
/// first bucket also includes its lower bound. Returns `None` outside 0..=100.
pub fn bucket_index(value: f64) -> Option<usize> {
    if value.is_nan() || value < BUCKET_BOUNDARIES[0] {
        return None;
    }
    BUCKET_BOUNDARIES.windows(2).position(|w| value <= w[1])
}

/// Count records per bucket.
///
/// All seven buckets are returned in ascending order, empty ones included.
/// Percentages are taken over the full record count.
pub fn analyze_distribution(
    records: &[StudentRecord],
) -> Result<Vec<DistributionBucket>, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let mut counts = [0usize; 7];
    for record in records {
        let average = record.require_average()?;
        let idx = bucket_index(average).ok_or(AnalysisError::AverageOutOfRange(average))?;
        counts[idx] += 1;
    }

    let total = records.len() as f64;
    let buckets = BUCKET_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| DistributionBucket {
            label: label.to_string(),
            lower: BUCKET_BOUNDARIES[i],
            upper: BUCKET_BOUNDARIES[i + 1],
            count: counts[i],
            percentage: counts[i] as f64 / total * 100.0,
        })
        .collect();

    tracing::debug!(?counts, "bucketed average marks");
    Ok(buckets)
}

/// Mean score per subject, in `SUBJECTS` order
pub fn subject_means(
    records: &[StudentRecord],
) -> Result<[(&'static str, f64); 3], AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }
    let n = records.len() as f64;
    let mean = |f: fn(&StudentRecord) -> u8| records.iter().map(|r| f(r) as f64).sum::<f64>() / n;

    Ok([
        (SUBJECTS[0], mean(|r| r.math)),
        (SUBJECTS[1], mean(|r| r.science)),
        (SUBJECTS[2], mean(|r| r.english)),
    ])
}

/// Number of students per grade, for grades that occur, ordered A..D
pub fn grade_counts(records: &[StudentRecord]) -> Vec<(Grade, usize)> {
    Grade::ALL
        .iter()
        .map(|&grade| (grade, records.iter().filter(|r| r.grade == grade).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Grades observed in the dataset, ordered A..D
pub fn observed_grades(records: &[StudentRecord]) -> Vec<Grade> {
    grade_counts(records).into_iter().map(|(g, _)| g).collect()
}

/// Count and percentage of students holding `grade`
pub fn grade_share(records: &[StudentRecord], grade: Grade) -> (usize, f64) {
    let count = records.iter().filter(|r| r.grade == grade).count();
    let pct = if records.is_empty() {
        0.0
    } else {
        count as f64 / records.len() as f64 * 100.0
    };
    (count, pct)
}

/// Mean of the derived averages across the class
pub fn class_average(records: &[StudentRecord]) -> Result<f64, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }
    let mut sum = 0.0;
    for record in records {
        sum += record.require_average()?;
    }
    Ok(sum / records.len() as f64)
}
