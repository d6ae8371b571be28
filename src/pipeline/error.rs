//! Error types for the analysis pipeline.
//!
//! Every stage of the pipeline is fatal on failure. `AnalysisError` covers
//! data errors (bad records), computation errors (degenerate splits or
//! evaluation), and the I/O wrappers used by the snapshot writer. The
//! `StageFailed` variant names the stage that aborted the run.

use std::fmt;

use thiserror::Error;

use super::dataset::Grade;

/// Pipeline stage, used to label fatal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dataset,
    Features,
    Distribution,
    Correlation,
    Split,
    Scale,
    Fit,
    Evaluate,
    Charts,
    Snapshot,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dataset => "Dataset",
            Stage::Features => "Feature derivation",
            Stage::Distribution => "Distribution",
            Stage::Correlation => "Correlation",
            Stage::Split => "Split",
            Stage::Scale => "Scale",
            Stage::Fit => "Fit",
            Stage::Evaluate => "Evaluate",
            Stage::Charts => "Charts",
            Stage::Snapshot => "Snapshot",
        };
        write!(f, "{}", name)
    }
}

/// Errors that can occur while analysing the marks dataset.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The dataset has no records.
    #[error("dataset contains no student records")]
    EmptyDataset,

    /// Two records share the same identifier.
    #[error("duplicate student id {0}")]
    DuplicateId(u32),

    /// A field holds a value outside its domain.
    #[error("student {id}: {field} = {value} is outside the range {min}..={max}")]
    FieldOutOfRange {
        id: u32,
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// A record reached a stage that needs the derived average before it was computed.
    #[error("student {0} has no derived average score")]
    MissingAverage(u32),

    /// A derived average cannot be placed in any distribution bucket.
    #[error("average score {0} is outside the 0-100 range")]
    AverageOutOfRange(f64),

    /// Split ratio is not a proper fraction.
    #[error("test size {0} must be strictly between 0 and 1")]
    InvalidTestSize(f64),

    /// The held-out partition ended up empty.
    #[error("test partition is empty - nothing to evaluate")]
    EmptyTestSet,

    /// The training partition ended up empty.
    #[error("training partition is empty - nothing to fit")]
    EmptyTrainingSet,

    /// A grade in the test partition was never seen during training.
    #[error("grade {0} appears in the test partition but never in training")]
    UnseenLabel(Grade),

    /// Feature rows and labels are not aligned.
    #[error("{rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    /// A feature row does not have the declared column count.
    #[error("expected {expected} feature columns, found {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    /// The forest was configured with no trees.
    #[error("forest needs at least one tree")]
    NoTrees,

    /// `predict` was called before `fit`.
    #[error("classifier has not been fitted")]
    NotFitted,

    /// Pearson correlation is undefined for a constant column.
    #[error("correlation between '{x}' and '{y}' is undefined (zero variance)")]
    ZeroVariance { x: String, y: String },

    /// A column required by a computation is missing or has the wrong type.
    #[error("column '{0}' is missing or not numeric")]
    InvalidColumn(String),

    /// Failure inside polars while building or reading a frame.
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    /// Failure writing an output file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Any of the above, tagged with the stage that raised it.
    #[error("{stage} stage failed")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Stage that raised this error, if it was tagged
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AnalysisError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, skipping stage tags
    pub fn root(&self) -> &AnalysisError {
        match self {
            AnalysisError::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Tag a stage result with the stage it came from
pub trait StageResultExt<T> {
    fn at_stage(self, stage: Stage) -> Result<T, AnalysisError>;
}

impl<T> StageResultExt<T> for Result<T, AnalysisError> {
    fn at_stage(self, stage: Stage) -> Result<T, AnalysisError> {
        self.map_err(|e| AnalysisError::StageFailed {
            stage,
            source: Box::new(e),
        })
    }
}
