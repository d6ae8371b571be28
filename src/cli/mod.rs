//! CLI module - argument parsing and run configuration

mod args;
mod config;

pub use args::{Cli, DEFAULT_CHART, DEFAULT_SNAPSHOT};
pub use config::AnalysisConfig;
