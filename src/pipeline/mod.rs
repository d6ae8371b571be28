//! Pipeline module - dataset, derived features, statistics and the grade classifier

pub mod classifier;
pub mod correlation;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod features;
pub mod snapshot;

pub use classifier::{
    feature_matrix, run_classifier, ClassificationReport, Classifier, ClassifierConfig,
    ClassifierOutcome, ConfusionMatrix, EvaluationResult, FeatureImportance, FeatureMatrix,
    ForestConfig, RandomForest, Scaler, ScalerParams, SplitStrategy, StandardScaler,
    FEATURE_NAMES,
};
pub use correlation::*;
pub use dataset::*;
pub use distribution::*;
pub use error::{AnalysisError, Stage, StageResultExt};
pub use features::*;
pub use snapshot::*;
