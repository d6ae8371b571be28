//! Resolved run configuration

use std::path::PathBuf;

use crate::pipeline::ClassifierConfig;

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub snapshot_path: PathBuf,
    /// `None` when charts are disabled
    pub chart_path: Option<PathBuf>,
    pub export_json_path: Option<PathBuf>,
    pub classifier: ClassifierConfig,
    pub verbose: bool,
}

impl AnalysisConfig {
    /// Directories that must exist before any file is written
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = std::iter::once(&self.snapshot_path)
            .chain(self.chart_path.iter())
            .chain(self.export_json_path.iter())
            .filter_map(|p| p.parent().map(|d| d.to_path_buf()))
            .filter(|d| !d.as_os_str().is_empty())
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }
}
