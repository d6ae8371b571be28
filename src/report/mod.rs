//! Report module - console sections, run summary and metrics export

pub mod console;
pub mod metrics_export;
pub mod summary;

pub use console::*;
pub use metrics_export::*;
pub use summary::*;
