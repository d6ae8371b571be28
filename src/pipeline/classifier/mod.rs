//! Grade classifier pipeline
//!
//! Runs four stages in order, each fatal on failure:
//! Split -> Scale -> Fit -> Evaluate.
//!
//! The concrete model and scaler sit behind the `Classifier` and `Scaler`
//! traits so tests can substitute deterministic fakes. A single seed drives
//! both the split and the forest.

pub mod forest;
pub mod metrics;
pub mod scaler;
pub mod split;
pub mod tree;

pub use forest::{ForestConfig, MaxFeatures, RandomForest};
pub use metrics::*;
pub use scaler::{Scaler, ScalerParams, StandardScaler};
pub use split::{train_test_split, test_count, SplitConfig, SplitStrategy, TrainTestSplit};
pub use tree::{gini_impurity, DecisionTree, DecisionTreeConfig};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::dataset::{Grade, StudentRecord};
use super::distribution::observed_grades;
use super::error::{AnalysisError, Stage, StageResultExt};

/// Model input columns, in matrix order
pub const FEATURE_NAMES: [&str; 5] = ["math", "science", "english", "attendance", "study_hours"];

/// Default seed shared by the split and the forest
pub const DEFAULT_SEED: u64 = 42;

/// Default number of trees in the forest
pub const DEFAULT_TREES: usize = 100;

/// Default held-out fraction
pub const DEFAULT_TEST_SIZE: f64 = 0.3;

/// Row-major numeric feature matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build a matrix, checking every row has one value per feature
    pub fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, AnalysisError> {
        let expected = feature_names.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != expected) {
            return Err(AnalysisError::FeatureCountMismatch {
                expected,
                actual: bad.len(),
            });
        }
        Ok(Self {
            feature_names,
            rows,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[index]).collect()
    }

    /// New matrix holding the given rows, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// Build the five-column model input from student records
pub fn feature_matrix(records: &[StudentRecord]) -> Result<FeatureMatrix, AnalysisError> {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.math as f64,
                r.science as f64,
                r.english as f64,
                r.attendance as f64,
                r.study_hours as f64,
            ]
        })
        .collect();

    FeatureMatrix::new(FEATURE_NAMES.iter().map(|s| s.to_string()).collect(), rows)
}

/// A model that learns grades from a feature matrix
pub trait Classifier {
    /// Train on aligned feature rows and labels
    fn fit(&mut self, features: &FeatureMatrix, labels: &[Grade]) -> Result<(), AnalysisError>;

    /// Predict one grade per feature row
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Grade>, AnalysisError>;

    /// Normalised per-feature importance, if the model can attribute it
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Settings for one classifier run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierConfig {
    pub seed: u64,
    pub n_trees: usize,
    pub test_size: f64,
    pub split: SplitStrategy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            n_trees: DEFAULT_TREES,
            test_size: DEFAULT_TEST_SIZE,
            split: SplitStrategy::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn split_config(&self) -> SplitConfig {
        SplitConfig {
            test_size: self.test_size,
            strategy: self.split,
        }
    }

    /// Forest settings sharing this run's seed
    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            n_trees: self.n_trees,
            seed: self.seed,
            ..ForestConfig::default()
        }
    }
}

/// Everything produced by a classifier run
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierOutcome {
    pub train_ids: Vec<u32>,
    pub test_ids: Vec<u32>,
    pub scaler: ScalerParams,
    pub y_test: Vec<Grade>,
    pub predictions: Vec<Grade>,
    pub evaluation: EvaluationResult,
}

/// Run Split -> Scale -> Fit -> Evaluate over the records.
///
/// The scaler is fitted on the training partition only and the same
/// parameters are applied to the test partition. Errors are tagged with the
/// stage that raised them.
pub fn run_classifier<C, S>(
    records: &[StudentRecord],
    config: &ClassifierConfig,
    classifier: &mut C,
    scaler: &S,
) -> Result<ClassifierOutcome, AnalysisError>
where
    C: Classifier + ?Sized,
    S: Scaler + ?Sized,
{
    let features = feature_matrix(records).at_stage(Stage::Split)?;
    let labels: Vec<Grade> = records.iter().map(|r| r.grade).collect();

    // Split
    let mut rng = StdRng::seed_from_u64(config.seed);
    let split = train_test_split(&features, &labels, &config.split_config(), &mut rng)
        .at_stage(Stage::Split)?;
    tracing::info!(
        train = split.y_train.len(),
        test = split.y_test.len(),
        strategy = %config.split,
        "split records"
    );

    // Scale
    let params = scaler.fit(&split.x_train).at_stage(Stage::Scale)?;
    let x_train = scaler.apply(&params, &split.x_train).at_stage(Stage::Scale)?;
    let x_test = scaler.apply(&params, &split.x_test).at_stage(Stage::Scale)?;
    tracing::debug!(means = ?params.means, stds = ?params.stds, "fitted scaler on training rows");

    // Fit
    classifier.fit(&x_train, &split.y_train).at_stage(Stage::Fit)?;
    tracing::info!(trees = config.n_trees, seed = config.seed, "fitted classifier");

    // Evaluate
    check_evaluable(&split.y_train, &split.y_test).at_stage(Stage::Evaluate)?;
    let predictions = classifier.predict(&x_test).at_stage(Stage::Evaluate)?;

    let importances = classifier
        .feature_importances()
        .unwrap_or_else(|| uniform_importances(features.n_features()));
    let evaluation = evaluate(
        &observed_grades(records),
        &split.y_test,
        &predictions,
        features.feature_names(),
        &importances,
    )
    .at_stage(Stage::Evaluate)?;
    tracing::info!(accuracy = evaluation.accuracy, "evaluated classifier");

    let ids = |indices: &[usize]| indices.iter().map(|&i| records[i].id).collect::<Vec<u32>>();

    Ok(ClassifierOutcome {
        train_ids: ids(&split.train_indices),
        test_ids: ids(&split.test_indices),
        scaler: params,
        y_test: split.y_test,
        predictions,
        evaluation,
    })
}
