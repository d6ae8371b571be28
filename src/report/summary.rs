//! Run summary shown at the end of the analysis

use std::path::{Path, PathBuf};
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

/// One completed pipeline step
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub name: String,
    pub detail: String,
    pub elapsed: Duration,
}

/// Summary of an analysis run
#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub records: usize,
    pub steps: Vec<StepRecord>,
    pub accuracy: Option<f64>,
    /// Files written, labelled by kind
    pub outputs: Vec<(String, PathBuf)>,
}

impl AnalysisSummary {
    pub fn new(records: usize) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn add_step(&mut self, name: &str, detail: impl Into<String>, elapsed: Duration) {
        self.steps.push(StepRecord {
            name: name.to_string(),
            detail: detail.into(),
            elapsed,
        });
    }

    pub fn set_accuracy(&mut self, accuracy: f64) {
        self.accuracy = Some(accuracy);
    }

    pub fn add_output(&mut self, kind: &str, path: &Path) {
        self.outputs.push((kind.to_string(), path.to_path_buf()));
    }

    pub fn total_time(&self) -> Duration {
        self.steps.iter().map(|s| s.elapsed).sum()
    }

    /// Closing checklist lines
    pub fn checklist(&self) -> Vec<String> {
        let model = match self.accuracy {
            Some(acc) => format!("ML Model: Random Forest with {:.0}% accuracy", acc * 100.0),
            None => "ML Model: not evaluated".to_string(),
        };
        let charts = if self.outputs.iter().any(|(kind, _)| kind == "Chart") {
            "Visualizations: Histogram, subject, scatter and grade charts"
        } else {
            "Visualizations: skipped"
        };

        vec![
            format!("Data Pipeline: {} records processed", self.records),
            model,
            charts.to_string(),
            "Business Insights: Actionable recommendations provided".to_string(),
        ]
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Result").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
        ]);

        for step in &self.steps {
            table.add_row(vec![
                Cell::new(&step.name),
                Cell::new(&step.detail),
                Cell::new(format_duration(step.elapsed)).add_attribute(Attribute::Dim),
            ]);
        }

        table.add_row(vec![
            Cell::new("⏱️  Total").add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(format_duration(self.total_time()))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("PROJECT SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        println!();
        for line in self.checklist() {
            println!("    {} {}", style("✓").green().bold(), line);
        }

        if !self.outputs.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("💾").cyan(),
                style("OUTPUT FILES").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for (kind, path) in &self.outputs {
                println!(
                    "      {} {:<10} {}",
                    style("•").dim(),
                    style(kind).yellow(),
                    path.display()
                );
            }
        }
    }
}

fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_secs_f64() * 1000.0;
    if millis < 1000.0 {
        format!("{:.1} ms", millis)
    } else {
        format!("{:.2} s", millis / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_reflects_run() {
        let mut summary = AnalysisSummary::new(15);
        summary.set_accuracy(0.8);
        summary.add_output("Snapshot", Path::new("out.csv"));

        let lines = summary.checklist();
        assert_eq!(lines[0], "Data Pipeline: 15 records processed");
        assert_eq!(lines[1], "ML Model: Random Forest with 80% accuracy");
        assert_eq!(lines[2], "Visualizations: skipped");
    }

    #[test]
    fn test_total_time_sums_steps() {
        let mut summary = AnalysisSummary::new(1);
        summary.add_step("a", "ok", Duration::from_millis(5));
        summary.add_step("b", "ok", Duration::from_millis(7));
        assert_eq!(summary.total_time(), Duration::from_millis(12));
        assert_eq!(summary.table().row_iter().count(), 3);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.5 ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50 s");
    }
}
