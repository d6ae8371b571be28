//! Evaluation metrics: accuracy, confusion matrix, classification report
//! and ranked feature importance

use std::collections::BTreeSet;

use serde::Serialize;

use crate::pipeline::dataset::Grade;
use crate::pipeline::error::AnalysisError;

/// Confusion counts; rows are true grades, columns predicted grades
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<Grade>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Tally predictions over `labels`.
    ///
    /// Any grade in `y_true` or `y_pred` missing from `labels` is added to
    /// the axis so no observation is dropped.
    pub fn from_predictions(labels: &[Grade], y_true: &[Grade], y_pred: &[Grade]) -> Self {
        let axis: BTreeSet<Grade> = labels
            .iter()
            .chain(y_true)
            .chain(y_pred)
            .copied()
            .collect();
        let labels: Vec<Grade> = axis.into_iter().collect();

        let position = |g: &Grade| labels.iter().position(|l| l == g).unwrap_or(0);
        let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            counts[position(t)][position(p)] += 1;
        }

        Self { labels, counts }
    }

    /// Number of test rows whose true grade is `labels[i]`
    pub fn row_sum(&self, i: usize) -> usize {
        self.counts[i].iter().sum()
    }

    /// Number of rows predicted as `labels[j]`
    pub fn column_sum(&self, j: usize) -> usize {
        self.counts.iter().map(|row| row[j]).sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|row| row.iter().sum::<usize>()).sum()
    }

    /// Diagonal total
    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }
}

/// Precision, recall and F1 for one grade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub grade: Grade,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-grade metrics over grades present in the truth or the predictions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

/// Importance score of one input feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Scores for a fitted classifier on the held-out partition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
    /// One entry per input feature, highest first
    pub importances: Vec<FeatureImportance>,
}

/// Fraction of predictions matching the truth
pub fn accuracy(y_true: &[Grade], y_pred: &[Grade]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Refuse to score an empty test set or one holding grades never trained on
pub fn check_evaluable(y_train: &[Grade], y_test: &[Grade]) -> Result<(), AnalysisError> {
    if y_test.is_empty() {
        return Err(AnalysisError::EmptyTestSet);
    }
    if let Some(unseen) = y_test.iter().find(|g| !y_train.contains(g)) {
        return Err(AnalysisError::UnseenLabel(*unseen));
    }
    Ok(())
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Build the per-grade report from a confusion matrix
pub fn classification_report(confusion: &ConfusionMatrix) -> ClassificationReport {
    let classes: Vec<ClassMetrics> = confusion
        .labels
        .iter()
        .enumerate()
        .filter(|(i, _)| confusion.row_sum(*i) > 0 || confusion.column_sum(*i) > 0)
        .map(|(i, &grade)| {
            let tp = confusion.counts[i][i];
            let support = confusion.row_sum(i);
            let precision = ratio(tp, confusion.column_sum(i));
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                grade,
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect();

    let total = confusion.total();
    let k = classes.len().max(1) as f64;
    let macro_avg = AverageMetrics {
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
        f1: classes.iter().map(|c| c.f1).sum::<f64>() / k,
        support: total,
    };

    let weight = |f: fn(&ClassMetrics) -> f64| {
        if total == 0 {
            0.0
        } else {
            classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total as f64
        }
    };
    let weighted_avg = AverageMetrics {
        precision: weight(|c| c.precision),
        recall: weight(|c| c.recall),
        f1: weight(|c| c.f1),
        support: total,
    };

    ClassificationReport {
        accuracy: ratio(confusion.correct(), total),
        classes,
        macro_avg,
        weighted_avg,
    }
}

/// Pair importances with feature names and sort highest first.
///
/// Equal scores keep declaration order.
pub fn rank_importances(
    feature_names: &[String],
    importances: &[f64],
) -> Result<Vec<FeatureImportance>, AnalysisError> {
    if feature_names.len() != importances.len() {
        return Err(AnalysisError::FeatureCountMismatch {
            expected: feature_names.len(),
            actual: importances.len(),
        });
    }

    let mut ranked: Vec<FeatureImportance> = feature_names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            feature: name.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(ranked)
}

/// Equal weight for every feature
pub fn uniform_importances(n_features: usize) -> Vec<f64> {
    if n_features == 0 {
        return Vec::new();
    }
    vec![1.0 / n_features as f64; n_features]
}

/// Score predictions against the truth.
///
/// `labels` is the grade axis for the confusion matrix (the grades observed
/// in the full dataset).
pub fn evaluate(
    labels: &[Grade],
    y_true: &[Grade],
    y_pred: &[Grade],
    feature_names: &[String],
    importances: &[f64],
) -> Result<EvaluationResult, AnalysisError> {
    if y_true.is_empty() {
        return Err(AnalysisError::EmptyTestSet);
    }
    if y_true.len() != y_pred.len() {
        return Err(AnalysisError::LengthMismatch {
            rows: y_pred.len(),
            labels: y_true.len(),
        });
    }

    let confusion = ConfusionMatrix::from_predictions(labels, y_true, y_pred);
    let report = classification_report(&confusion);

    Ok(EvaluationResult {
        accuracy: accuracy(y_true, y_pred),
        confusion,
        report,
        importances: rank_importances(feature_names, importances)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use Grade::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[A, B, C, D], &[A, B, D, D]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_confusion_matrix_axis_and_counts() {
        let cm = ConfusionMatrix::from_predictions(&[A, B, C, D], &[A, A, B, D], &[A, B, B, C]);

        assert_eq!(cm.labels, vec![A, B, C, D]);
        assert_eq!(cm.counts[0], vec![1, 1, 0, 0]);
        assert_eq!(cm.counts[1], vec![0, 1, 0, 0]);
        assert_eq!(cm.counts[3], vec![0, 0, 1, 0]);
        assert_eq!(cm.row_sum(0), 2);
        assert_eq!(cm.column_sum(1), 2);
        assert_eq!(cm.correct(), 2);
        assert_eq!(cm.total(), 4);
    }

    #[test]
    fn test_confusion_matrix_extends_axis() {
        let cm = ConfusionMatrix::from_predictions(&[A, B], &[A], &[D]);
        assert_eq!(cm.labels, vec![A, B, D]);
        assert_eq!(cm.counts[0][2], 1);
    }

    #[test]
    fn test_classification_report_values() {
        let cm = ConfusionMatrix::from_predictions(&[A, B, C, D], &[A, A, B, B], &[A, B, B, B]);
        let report = classification_report(&cm);

        // C and D never occur, so they are left out
        assert_eq!(report.classes.len(), 2);
        let a = &report.classes[0];
        assert_eq!(a.grade, A);
        assert_eq!(a.precision, 1.0);
        assert_eq!(a.recall, 0.5);
        assert!((a.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(a.support, 2);

        let b = &report.classes[1];
        assert!((b.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(b.recall, 1.0);

        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.macro_avg.support, 4);
        assert!((report.macro_avg.recall - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_check_evaluable() {
        assert!(check_evaluable(&[A, B], &[B, A]).is_ok());
        assert!(matches!(
            check_evaluable(&[A, B], &[]),
            Err(AnalysisError::EmptyTestSet)
        ));
        assert!(matches!(
            check_evaluable(&[A, B], &[A, D]),
            Err(AnalysisError::UnseenLabel(D))
        ));
    }

    #[test]
    fn test_rank_importances_descending_and_stable() {
        let names: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let ranked = rank_importances(&names, &[0.2, 0.6, 0.2]).unwrap();

        let order: Vec<&str> = ranked.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["y", "x", "z"]);
        assert!(rank_importances(&names, &[1.0]).is_err());
    }

    #[test]
    fn test_evaluate_rejects_empty_and_mismatch() {
        let names = vec!["x".to_string()];
        assert!(matches!(
            evaluate(&[A], &[], &[], &names, &[1.0]),
            Err(AnalysisError::EmptyTestSet)
        ));
        assert!(matches!(
            evaluate(&[A], &[A, A], &[A], &names, &[1.0]),
            Err(AnalysisError::LengthMismatch { .. })
        ));
    }
}
