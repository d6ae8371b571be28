//! Console report sections
//!
//! Each section has a pure builder (a comfy-table `Table` or a list of lines)
//! and a `print_*` wrapper that writes it to stdout with the shared styling.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{
    class_average, grade_share, AnalysisError, ClassificationReport, ConfusionMatrix, Correlation,
    DistributionBucket, EvaluationResult, FeatureImportance, Grade, StudentRecord,
};
use crate::utils::{print_bullet, print_indented, print_section_header, print_success};

/// Rows shown in the dataset preview
pub const PREVIEW_ROWS: usize = 5;

/// Fixed follow-up actions printed after the findings
pub const RECOMMENDATIONS: [&str; 4] = [
    "Focus on students with <3 study hours per day",
    "Implement attendance improvement programs for students <80%",
    "Provide additional support for D-grade students",
    "Recognize high-performing students to maintain motivation",
];

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::A => Color::Green,
        Grade::B => Color::Cyan,
        Grade::C => Color::Yellow,
        Grade::D => Color::Red,
    }
}

// ============================================================================
// Pipeline checklist and preview
// ============================================================================

/// Data pipeline stages completed before any analysis runs
pub fn pipeline_checklist(records: &[StudentRecord]) -> Vec<String> {
    vec![
        format!(
            "Data Collection: {} student performance records loaded",
            records.len()
        ),
        "Data Cleaning: no missing values detected".to_string(),
        "Feature Engineering: average marks calculated".to_string(),
    ]
}

pub fn print_pipeline_checklist(records: &[StudentRecord]) {
    for (i, line) in pipeline_checklist(records).iter().enumerate() {
        print_success(&format!("{}. {}", i + 1, line));
    }
}

/// First `PREVIEW_ROWS` records of the augmented dataset
pub fn preview_table(records: &[StudentRecord]) -> Table {
    let mut table = new_table(&[
        "ID", "Name", "Math", "Science", "English", "Attend.", "Hours", "Grade", "Average",
    ]);

    for record in records.iter().take(PREVIEW_ROWS) {
        let average = record
            .average
            .map(|a| format!("{:.1}", a))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(&record.name),
            Cell::new(record.math).set_alignment(CellAlignment::Right),
            Cell::new(record.science).set_alignment(CellAlignment::Right),
            Cell::new(record.english).set_alignment(CellAlignment::Right),
            Cell::new(record.attendance).set_alignment(CellAlignment::Right),
            Cell::new(record.study_hours).set_alignment(CellAlignment::Right),
            Cell::new(record.grade).fg(grade_color(record.grade)),
            Cell::new(average).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Print the preview and the `(rows, columns)` shape of the snapshot frame
pub fn print_preview(records: &[StudentRecord], shape: (usize, usize)) {
    print_section_header("🔍", "DATASET OVERVIEW");
    print_indented(&preview_table(records));
    println!(
        "      Shape: {} rows × {} columns",
        style(shape.0).yellow().bold(),
        style(shape.1).yellow().bold()
    );
}

// ============================================================================
// Distribution
// ============================================================================

pub fn distribution_table(buckets: &[DistributionBucket]) -> Table {
    let mut table = new_table(&["Marks Range", "Students", "Share"]);

    for bucket in buckets {
        let count = if bucket.count == 0 {
            Cell::new(bucket.count).add_attribute(Attribute::Dim)
        } else {
            Cell::new(bucket.count).fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&bucket.label),
            count.set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", bucket.percentage)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

pub fn print_distribution(buckets: &[DistributionBucket]) {
    print_section_header("📊", "MARKS DISTRIBUTION");
    print_indented(&distribution_table(buckets));
}

// ============================================================================
// Classifier evaluation
// ============================================================================

pub fn classification_report_table(report: &ClassificationReport) -> Table {
    let mut table = new_table(&["Grade", "Precision", "Recall", "F1", "Support"]);

    let metric = |v: f64| Cell::new(format!("{:.2}", v)).set_alignment(CellAlignment::Right);

    for class in &report.classes {
        table.add_row(vec![
            Cell::new(class.grade).fg(grade_color(class.grade)),
            metric(class.precision),
            metric(class.recall),
            metric(class.f1),
            Cell::new(class.support).set_alignment(CellAlignment::Right),
        ]);
    }

    for (label, avg) in [
        ("macro avg", &report.macro_avg),
        ("weighted avg", &report.weighted_avg),
    ] {
        table.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Italic),
            metric(avg.precision),
            metric(avg.recall),
            metric(avg.f1),
            Cell::new(avg.support).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Confusion matrix with true grades as rows and predictions as columns
pub fn confusion_table(confusion: &ConfusionMatrix) -> Table {
    let mut headers = vec!["True \\ Pred".to_string()];
    headers.extend(confusion.labels.iter().map(Grade::to_string));
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let mut table = new_table(&header_refs);

    for (i, grade) in confusion.labels.iter().enumerate() {
        let mut row = vec![Cell::new(grade).add_attribute(Attribute::Bold)];
        row.extend(confusion.counts[i].iter().enumerate().map(|(j, &count)| {
            let cell = Cell::new(count).set_alignment(CellAlignment::Right);
            if i == j && count > 0 {
                cell.fg(Color::Green)
            } else if count > 0 {
                cell.fg(Color::Red)
            } else {
                cell
            }
        }));
        table.add_row(row);
    }

    table
}

pub fn print_evaluation(evaluation: &EvaluationResult) {
    print_section_header("🎯", "MODEL EVALUATION");
    println!(
        "      Model Accuracy: {}",
        style(format!("{:.2}%", evaluation.accuracy * 100.0))
            .green()
            .bold()
    );

    println!();
    println!("      {}", style("Classification Report").yellow());
    print_indented(&classification_report_table(&evaluation.report));

    println!();
    println!("      {}", style("Confusion Matrix").yellow());
    print_indented(&confusion_table(&evaluation.confusion));
}

pub fn importance_table(importances: &[FeatureImportance]) -> Table {
    let mut table = new_table(&["Rank", "Feature", "Importance"]);

    for (rank, entry) in importances.iter().enumerate() {
        let bar = "█".repeat((entry.importance * 40.0).round() as usize);
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.feature),
            Cell::new(format!("{:.4} {}", entry.importance, bar)).fg(Color::Cyan),
        ]);
    }

    table
}

pub fn print_importances(importances: &[FeatureImportance]) {
    print_section_header("🌲", "FEATURE IMPORTANCE");
    print_indented(&importance_table(importances));
}

// ============================================================================
// Insights
// ============================================================================

/// Headline numbers for the insights section
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFindings {
    pub class_average: f64,
    /// Count and percentage of A-grade students
    pub top_performers: (usize, f64),
    /// Count and percentage of D-grade students
    pub at_risk: (usize, f64),
    pub attendance_correlation: Option<f64>,
    pub study_hours_correlation: Option<f64>,
}

impl KeyFindings {
    /// Gather the findings; correlations are looked up by feature name
    pub fn compute(
        records: &[StudentRecord],
        correlations: &[Correlation],
    ) -> Result<Self, AnalysisError> {
        let lookup = |feature: &str| {
            correlations
                .iter()
                .find(|c| c.feature == feature)
                .map(|c| c.coefficient)
        };

        Ok(Self {
            class_average: class_average(records)?,
            top_performers: grade_share(records, Grade::A),
            at_risk: grade_share(records, Grade::D),
            attendance_correlation: lookup("attendance"),
            study_hours_correlation: lookup("study_hours"),
        })
    }

    pub fn lines(&self) -> Vec<String> {
        let corr = |c: Option<f64>| {
            c.map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "n/a".to_string())
        };

        vec![
            format!("Average class performance: {:.1}", self.class_average),
            format!(
                "Top performing students: {} ({:.1}%)",
                self.top_performers.0, self.top_performers.1
            ),
            format!(
                "Students at risk (D grade): {} ({:.1}%)",
                self.at_risk.0, self.at_risk.1
            ),
            format!(
                "Attendance correlation with performance: {}",
                corr(self.attendance_correlation)
            ),
            format!(
                "Study hours correlation with performance: {}",
                corr(self.study_hours_correlation)
            ),
        ]
    }
}

pub fn print_key_findings(findings: &KeyFindings) {
    print_section_header("💡", "KEY FINDINGS");
    for line in findings.lines() {
        print_bullet(&line);
    }
}

pub fn print_recommendations() {
    print_section_header("📝", "RECOMMENDATIONS");
    for (i, recommendation) in RECOMMENDATIONS.iter().enumerate() {
        println!("      {}. {}", style(i + 1).cyan().bold(), recommendation);
    }
}
