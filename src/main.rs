//! Markscope: Student Marks Analysis CLI
//!
//! Derives average marks for a fixed class, buckets them, renders a chart
//! dashboard, trains a random forest grade classifier and reports the results.

mod chart;
mod cli;
mod pipeline;
mod report;
mod utils;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use chart::{render_dashboard, ChartData};
use cli::Cli;
use pipeline::{
    analyze_distribution, build_snapshot_frame, correlations_with, derive_averages, grade_counts,
    run_classifier, save_snapshot, student_records, validate_records, RandomForest, Stage,
    StageResultExt, StandardScaler,
};
use report::{
    export_metrics, print_distribution, print_evaluation, print_importances, print_key_findings,
    print_pipeline_checklist, print_preview, print_recommendations, AnalysisSummary, KeyFindings,
    MetricsExport,
};
use utils::{
    create_spinner, finish_with_failure, finish_with_success, init_logging, print_banner,
    print_completion, print_config, print_info, print_step_header, print_success,
};

/// Features correlated against the derived average in the findings
const CORRELATED_FEATURES: [&str; 2] = ["attendance", "study_hours"];

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.analysis_config();
    init_logging(config.verbose)?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config);

    for dir in config.output_dirs() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    // Step 1: Dataset and derived features
    print_step_header(1, "Data Pipeline");

    let step_start = Instant::now();
    let records = student_records();
    validate_records(&records).at_stage(Stage::Dataset)?;
    let records = derive_averages(&records);
    let mut frame = build_snapshot_frame(&records).at_stage(Stage::Features)?;

    let mut summary = AnalysisSummary::new(records.len());
    print_pipeline_checklist(&records);
    print_preview(&records, frame.shape());
    summary.add_step(
        "Data Pipeline",
        format!("{} records, averages derived", records.len()),
        step_start.elapsed(),
    );

    // Step 2: Distribution
    print_step_header(2, "Marks Distribution");

    let step_start = Instant::now();
    let buckets = analyze_distribution(&records).at_stage(Stage::Distribution)?;
    print_distribution(&buckets);
    summary.add_step("Distribution", "7 buckets", step_start.elapsed());

    // Step 3: Charts
    print_step_header(3, "Visualizations");

    let step_start = Instant::now();
    match &config.chart_path {
        Some(chart_path) => {
            let spinner = create_spinner("Rendering dashboard...");
            let result = ChartData::from_records(&records)
                .map_err(anyhow::Error::from)
                .and_then(|data| render_dashboard(chart_path, &data));
            if let Err(e) = result {
                finish_with_failure(&spinner, "Rendering failed");
                return Err(e).with_context(|| format!("{} stage failed", Stage::Charts));
            }
            finish_with_success(
                &spinner,
                &format!("Dashboard saved to {}", chart_path.display()),
            );
            summary.add_output("Chart", chart_path);
            summary.add_step("Visualizations", "4 panels", step_start.elapsed());
        }
        None => print_info("Chart rendering disabled (--no-charts)"),
    }

    // Step 4: Classifier
    print_step_header(4, "Grade Classifier");

    let step_start = Instant::now();
    let spinner = create_spinner(&format!(
        "Training random forest ({} trees)...",
        config.classifier.n_trees
    ));
    let mut forest = RandomForest::new(config.classifier.forest_config());
    let outcome = match run_classifier(&records, &config.classifier, &mut forest, &StandardScaler)
    {
        Ok(outcome) => outcome,
        Err(e) => {
            finish_with_failure(&spinner, "Classifier failed");
            return Err(e).context("Grade classifier failed");
        }
    };
    finish_with_success(
        &spinner,
        &format!(
            "Trained on {} students, tested on {}",
            outcome.train_ids.len(),
            outcome.test_ids.len()
        ),
    );
    print_evaluation(&outcome.evaluation);
    print_importances(&outcome.evaluation.importances);
    summary.set_accuracy(outcome.evaluation.accuracy);
    summary.add_step(
        "Classifier",
        format!("accuracy {:.2}%", outcome.evaluation.accuracy * 100.0),
        step_start.elapsed(),
    );

    // Step 5: Insights
    print_step_header(5, "Business Insights");

    let step_start = Instant::now();
    let correlations = correlations_with(&frame, "average_marks", &CORRELATED_FEATURES)
        .at_stage(Stage::Correlation)?;
    let findings = KeyFindings::compute(&records, &correlations).at_stage(Stage::Correlation)?;
    print_key_findings(&findings);
    print_recommendations();
    summary.add_step("Insights", "findings and recommendations", step_start.elapsed());

    // Step 6: Save results
    print_step_header(6, "Save Results");

    let step_start = Instant::now();
    let spinner = create_spinner("Writing snapshot...");
    save_snapshot(&mut frame, &config.snapshot_path)
        .with_context(|| format!("{} stage failed", Stage::Snapshot))?;
    finish_with_success(
        &spinner,
        &format!("Saved to {}", config.snapshot_path.display()),
    );
    summary.add_output("Snapshot", &config.snapshot_path);

    if let Some(json_path) = &config.export_json_path {
        let export = MetricsExport::new(
            &config.classifier,
            records.len(),
            &buckets,
            &grade_counts(&records),
            &correlations,
            &outcome,
        );
        export_metrics(json_path, &export)?;
        print_success(&format!("Metrics exported to {}", json_path.display()));
        summary.add_output("Metrics", json_path);
    }
    summary.add_step("Save Results", "snapshot written", step_start.elapsed());

    summary.display();
    print_completion();

    Ok(())
}
