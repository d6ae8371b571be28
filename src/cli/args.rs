//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use super::AnalysisConfig;
use crate::pipeline::{ClassifierConfig, SplitStrategy};

/// Default snapshot file name (relative to the output directory)
pub const DEFAULT_SNAPSHOT: &str = "student_analysis_results.csv";

/// Default chart file name (relative to the output directory)
pub const DEFAULT_CHART: &str = "student_marks_analysis.png";

/// Markscope - Analyse student marks distribution and classify grades.
/// Running with no arguments performs the full analysis with defaults.
#[derive(Parser, Debug)]
#[command(name = "markscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory that receives the snapshot, chart and optional JSON export
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Snapshot file name (CSV or Parquet, determined by extension).
    /// Relative paths are resolved against --output-dir.
    #[arg(long, default_value = DEFAULT_SNAPSHOT)]
    pub snapshot: PathBuf,

    /// Chart file name (PNG). Relative paths are resolved against --output-dir.
    #[arg(long, default_value = DEFAULT_CHART)]
    pub chart: PathBuf,

    /// Seed shared by the train/test split and the forest
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of trees in the random forest
    #[arg(long, default_value = "100", value_parser = validate_trees)]
    pub trees: usize,

    /// Fraction of students held out for testing (0.0 to 1.0, exclusive)
    #[arg(long, default_value = "0.3", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Train/test split strategy.
    /// Options: "stratified" (default, keeps every grade in training) or "shuffle"
    #[arg(long, default_value = "stratified")]
    pub split: SplitStrategy,

    /// Also write evaluation metrics as JSON to this file
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Skip rendering the chart image
    #[arg(long, default_value = "false")]
    pub no_charts: bool,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Cli {
    /// Resolve a file name against the output directory
    fn resolve(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.resolve(&self.snapshot)
    }

    pub fn chart_path(&self) -> Option<PathBuf> {
        if self.no_charts {
            None
        } else {
            Some(self.resolve(&self.chart))
        }
    }

    pub fn export_json_path(&self) -> Option<PathBuf> {
        self.export_json.as_deref().map(|p| self.resolve(p))
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            seed: self.seed,
            n_trees: self.trees,
            test_size: self.test_size,
            split: self.split,
        }
    }

    /// Resolve every path and setting needed for a run
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            snapshot_path: self.snapshot_path(),
            chart_path: self.chart_path(),
            export_json_path: self.export_json_path(),
            classifier: self.classifier_config(),
            verbose: self.verbose,
        }
    }
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

/// Validator for trees parameter
fn validate_trees(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid tree count", s))?;

    if value == 0 {
        Err("trees must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
