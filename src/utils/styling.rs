//! Terminal styling utilities for the analysis report

use console::{style, Emoji};
use std::path::Path;

use crate::cli::AnalysisConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SEED: Emoji<'_, '_> = Emoji("🌱 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static TREE: Emoji<'_, '_> = Emoji("🌲 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
    ███╗   ███╗ █████╗ ██████╗ ██╗  ██╗███████╗
    ████╗ ████║██╔══██╗██╔══██╗██║ ██╔╝██╔════╝
    ██╔████╔██║███████║██████╔╝█████╔╝ ███████╗
    ██║╚██╔╝██║██╔══██║██╔══██╗██╔═██╗ ╚════██║
    ██║ ╚═╝ ██║██║  ██║██║  ██║██║  ██╗███████║
    ╚═╝     ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝╚══════╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("scope").magenta().bold(),
        style("Student marks distribution and grade classification").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(config: &AnalysisConfig) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let chart = config
        .chart_path
        .as_deref()
        .map(|p| truncate_path(p, 38))
        .unwrap_or_else(|| "disabled".to_string());

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Snapshot: {:<37}│",
        SAVE,
        truncate_path(&config.snapshot_path, 36)
    );
    println!("    │  {} Chart:    {:<37}│", CHART, truncate_string(&chart, 36));
    if let Some(json) = &config.export_json_path {
        println!(
            "    │  {} Metrics:  {:<37}│",
            FOLDER,
            truncate_path(json, 36)
        );
    }
    println!("    ├{}┤", line);
    println!(
        "    │  {} Seed:      {:<36}│",
        SEED,
        style(config.classifier.seed).yellow()
    );
    println!(
        "    │  {} Trees:     {:<36}│",
        TREE,
        style(config.classifier.n_trees).yellow()
    );
    println!(
        "    │  {} Test size: {:<36}│",
        CHART,
        style(format!(
            "{:.0}% ({})",
            config.classifier.test_size * 100.0,
            config.classifier.split
        ))
        .yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a section title without a step number
pub fn print_section_header(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a bullet line under a section
pub fn print_bullet(message: &str) {
    println!("      {} {}", style("•").dim(), message);
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Markscope analysis complete!").green().bold()
    );
    println!();
}

/// Print a comfy-table indented to line up with the section text
pub fn print_indented(table: &impl std::fmt::Display) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "...hijkl");
    }

    #[test]
    fn test_truncate_string_multibyte() {
        let s = "ééééééééééé";
        assert_eq!(truncate_string(s, 6).chars().count(), 6);
    }
}
