//! Seeded train/test partitioning

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::FeatureMatrix;
use crate::pipeline::dataset::Grade;
use crate::pipeline::error::AnalysisError;

/// How rows are assigned to the test partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SplitStrategy {
    /// Allocate test rows per grade in proportion, keeping at least one
    /// training row for every grade that has two or more members
    #[default]
    Stratified,
    /// Plain shuffle, first rows of the permutation become the test set
    Shuffle,
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitStrategy::Stratified => write!(f, "stratified"),
            SplitStrategy::Shuffle => write!(f, "shuffle"),
        }
    }
}

impl FromStr for SplitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stratified" => Ok(SplitStrategy::Stratified),
            "shuffle" => Ok(SplitStrategy::Shuffle),
            _ => Err(format!(
                "Unknown split strategy: '{}'. Use 'stratified' or 'shuffle'.",
                s
            )),
        }
    }
}

/// Split ratio and strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing, strictly between 0 and 1
    pub test_size: f64,
    pub strategy: SplitStrategy,
}

/// Train and test partitions with their source row indices
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub x_train: FeatureMatrix,
    pub x_test: FeatureMatrix,
    pub y_train: Vec<Grade>,
    pub y_test: Vec<Grade>,
}

/// Number of test rows for `n` rows: `ceil(n * test_size)`
pub fn test_count(n: usize, test_size: f64) -> usize {
    // The epsilon keeps products such as 10 * 0.3 = 3.0000000000000004 at 3
    ((n as f64 * test_size) - 1e-9).ceil().max(0.0) as usize
}

/// Partition rows into train and test sets.
///
/// Feature rows and labels stay aligned. The same `rng` state always yields
/// the same partition.
pub fn train_test_split<R: Rng + ?Sized>(
    features: &FeatureMatrix,
    labels: &[Grade],
    config: &SplitConfig,
    rng: &mut R,
) -> Result<TrainTestSplit, AnalysisError> {
    if !(config.test_size > 0.0 && config.test_size < 1.0) {
        return Err(AnalysisError::InvalidTestSize(config.test_size));
    }
    if features.n_rows() != labels.len() {
        return Err(AnalysisError::LengthMismatch {
            rows: features.n_rows(),
            labels: labels.len(),
        });
    }

    let n = labels.len();
    if n == 0 {
        return Err(AnalysisError::EmptyDataset);
    }

    let n_test = test_count(n, config.test_size);
    if n_test == 0 {
        return Err(AnalysisError::EmptyTestSet);
    }
    if n_test >= n {
        return Err(AnalysisError::EmptyTrainingSet);
    }

    let (train_indices, test_indices) = match config.strategy {
        SplitStrategy::Shuffle => {
            let mut permutation: Vec<usize> = (0..n).collect();
            permutation.shuffle(rng);
            let train = permutation.split_off(n_test);
            (train, permutation)
        }
        SplitStrategy::Stratified => stratified_indices(labels, n_test, rng),
    };

    Ok(TrainTestSplit {
        x_train: features.select(&train_indices),
        x_test: features.select(&test_indices),
        y_train: train_indices.iter().map(|&i| labels[i]).collect(),
        y_test: test_indices.iter().map(|&i| labels[i]).collect(),
        train_indices,
        test_indices,
    })
}

/// Pick test rows per grade, returning (train, test) indices in ascending order
fn stratified_indices<R: Rng + ?Sized>(
    labels: &[Grade],
    n_test: usize,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let mut groups: BTreeMap<Grade, Vec<usize>> = BTreeMap::new();
    for (i, &grade) in labels.iter().enumerate() {
        groups.entry(grade).or_default().push(i);
    }

    let sizes: Vec<usize> = groups.values().map(Vec::len).collect();
    let allocation = allocate_test_rows(&sizes, n_test);

    let mut train = Vec::with_capacity(labels.len() - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (mut members, take) in groups.into_values().zip(allocation) {
        members.shuffle(rng);
        test.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Largest-remainder allocation of `n_test` rows across groups.
///
/// Each group first gets the floor of its proportional share, capped so it
/// keeps one training row. Leftover rows go to the largest remainders, ties
/// to the earlier group. Caps are lifted only if the total cannot be met.
fn allocate_test_rows(sizes: &[usize], n_test: usize) -> Vec<usize> {
    let total: usize = sizes.iter().sum();
    let mut caps: Vec<usize> = sizes.iter().map(|s| s.saturating_sub(1)).collect();

    let mut allocation: Vec<usize> = sizes
        .iter()
        .zip(&caps)
        .map(|(&size, &cap)| (n_test * size / total).min(cap))
        .collect();

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by_key(|&g| std::cmp::Reverse((n_test * sizes[g]) % total));

    let mut remaining = n_test - allocation.iter().sum::<usize>();
    let mut relaxed = false;
    while remaining > 0 {
        let mut progressed = false;
        for &g in &order {
            if remaining == 0 {
                break;
            }
            if allocation[g] < caps[g] {
                allocation[g] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            if relaxed {
                break;
            }
            caps = sizes.to_vec();
            relaxed = true;
        }
    }

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_count_rounds_up() {
        assert_eq!(test_count(15, 0.3), 5);
        assert_eq!(test_count(10, 0.3), 3);
        assert_eq!(test_count(4, 0.3), 2);
        assert_eq!(test_count(3, 0.01), 1);
    }

    #[test]
    fn test_allocation_for_marks_dataset() {
        // A=5, B=6, C=2, D=2 with 5 test rows
        let allocation = allocate_test_rows(&[5, 6, 2, 2], 5);
        assert_eq!(allocation.iter().sum::<usize>(), 5);
        assert_eq!(allocation, vec![2, 2, 1, 0]);
    }

    #[test]
    fn test_allocation_keeps_training_row_per_group() {
        let sizes = [2, 2, 2, 2];
        let allocation = allocate_test_rows(&sizes, 4);
        assert_eq!(allocation, vec![1, 1, 1, 1]);
        assert!(allocation.iter().zip(&sizes).all(|(a, s)| a < s));
    }

    #[test]
    fn test_allocation_relaxes_caps_when_needed() {
        // Four singletons cannot all stay in training with 2 test rows
        let allocation = allocate_test_rows(&[1, 1, 1, 1], 2);
        assert_eq!(allocation.iter().sum::<usize>(), 2);
    }

    #[test]
    fn test_split_strategy_from_str() {
        assert_eq!("Stratified".parse::<SplitStrategy>().unwrap(), SplitStrategy::Stratified);
        assert_eq!("shuffle".parse::<SplitStrategy>().unwrap(), SplitStrategy::Shuffle);
        assert!("kfold".parse::<SplitStrategy>().is_err());
    }
}
