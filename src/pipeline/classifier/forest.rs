//! Random forest over bootstrap-resampled CART trees

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::metrics::uniform_importances;
use super::tree::{DecisionTree, DecisionTreeConfig};
use super::{Classifier, FeatureMatrix};
use crate::pipeline::dataset::Grade;
use crate::pipeline::error::AnalysisError;

/// Number of features examined at each split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MaxFeatures {
    /// `max(1, floor(sqrt(n_features)))`
    #[default]
    Sqrt,
    /// Every feature at every split
    All,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => *k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Train each tree on a bootstrap resample instead of all rows
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: super::DEFAULT_TREES,
            seed: super::DEFAULT_SEED,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            bootstrap: true,
        }
    }
}

/// Majority-vote ensemble of decision trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    /// Distinct training grades; tree class index `k` means `classes[k]`
    classes: Vec<Grade>,
    n_features: usize,
    importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            classes: Vec::new(),
            n_features: 0,
            importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Grades seen during training, ordered A..D
    pub fn classes(&self) -> &[Grade] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Vote counts per training class for one row
    pub fn votes(&self, row: &[f64]) -> Vec<usize> {
        let mut votes = vec![0usize; self.classes.len()];
        for tree in &self.trees {
            votes[tree.predict_row(row)] += 1;
        }
        votes
    }

    /// Average the per-tree importances of trees that split at least once,
    /// then renormalise. Falls back to uniform when no tree split.
    fn aggregate_importances(&self) -> Vec<f64> {
        let mut sum = vec![0.0; self.n_features];
        let mut contributing = 0usize;

        for tree in self.trees.iter().filter(|t| t.has_splits()) {
            for (acc, value) in sum.iter_mut().zip(tree.feature_importances()) {
                *acc += value;
            }
            contributing += 1;
        }

        let total: f64 = sum.iter().sum();
        if contributing == 0 || total <= 0.0 {
            return uniform_importances(self.n_features);
        }
        sum.iter().map(|v| v / total).collect()
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Grade]) -> Result<(), AnalysisError> {
        if self.config.n_trees == 0 {
            return Err(AnalysisError::NoTrees);
        }
        if features.n_rows() != labels.len() {
            return Err(AnalysisError::LengthMismatch {
                rows: features.n_rows(),
                labels: labels.len(),
            });
        }
        if features.is_empty() {
            return Err(AnalysisError::EmptyTrainingSet);
        }

        let mut classes = labels.to_vec();
        classes.sort();
        classes.dedup();

        // Map each label to its position in `classes`
        let y: Vec<usize> = labels
            .iter()
            .map(|g| classes.binary_search(g).unwrap_or(0))
            .collect();

        let n = features.n_rows();
        let n_features = features.n_features();
        let tree_config = DecisionTreeConfig {
            max_features: self.config.max_features.resolve(n_features),
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
        };

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let all_rows: Vec<usize> = (0..n).collect();

        let trees: Vec<DecisionTree> = (0..self.config.n_trees)
            .map(|_| {
                let samples: Vec<usize> = if self.config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    all_rows.clone()
                };
                DecisionTree::fit(features.rows(), &y, &samples, classes.len(), &tree_config, &mut rng)
            })
            .collect();

        tracing::debug!(
            trees = trees.len(),
            classes = classes.len(),
            max_features = tree_config.max_features,
            "grew forest"
        );

        self.trees = trees;
        self.classes = classes;
        self.n_features = n_features;
        self.importances = self.aggregate_importances();
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Grade>, AnalysisError> {
        if !self.is_fitted() {
            return Err(AnalysisError::NotFitted);
        }
        if features.n_features() != self.n_features {
            return Err(AnalysisError::FeatureCountMismatch {
                expected: self.n_features,
                actual: features.n_features(),
            });
        }

        let predictions = features
            .rows()
            .iter()
            .map(|row| {
                let votes = self.votes(row);
                // Ties go to the earliest grade
                let mut best = 0;
                for (k, &count) in votes.iter().enumerate() {
                    if count > votes[best] {
                        best = k;
                    }
                }
                self.classes[best]
            })
            .collect();

        Ok(predictions)
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        if self.is_fitted() {
            Some(self.importances.clone())
        } else {
            None
        }
    }
}
