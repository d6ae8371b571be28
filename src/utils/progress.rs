//! Progress spinner helpers using indicatif

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for a single analysis step
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("    {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Finish a spinner with a success message
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

/// Finish a spinner after a failed step, leaving the message on screen
pub fn finish_with_failure(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("❌ {}", message));
}
