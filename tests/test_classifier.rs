//! Integration tests for the Split -> Scale -> Fit -> Evaluate pipeline

use std::collections::BTreeSet;

use markscope::pipeline::classifier::{uniform_importances, DecisionTree};
use markscope::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn run_forest(config: &ClassifierConfig) -> Result<ClassifierOutcome, AnalysisError> {
    let mut forest = RandomForest::new(config.forest_config());
    run_classifier(&derived_records(), config, &mut forest, &StandardScaler)
}

#[test]
fn test_default_run_partitions_class() {
    let outcome = run_forest(&ClassifierConfig::default()).unwrap();

    assert_eq!(outcome.test_ids.len(), 5);
    assert_eq!(outcome.train_ids.len(), 10);

    let all: BTreeSet<u32> = outcome
        .train_ids
        .iter()
        .chain(&outcome.test_ids)
        .copied()
        .collect();
    assert_eq!(all.len(), 15);
}

#[test]
fn test_stratified_split_trains_on_every_grade() {
    let records = derived_records();
    let outcome = run_forest(&ClassifierConfig::default()).unwrap();

    let train_grades: BTreeSet<Grade> = outcome
        .train_ids
        .iter()
        .map(|id| records[*id as usize - 1].grade)
        .collect();
    assert_eq!(train_grades.len(), 4);
}

#[test]
fn test_same_seed_is_reproducible() {
    let config = ClassifierConfig::default();
    let first = run_forest(&config).unwrap();
    let second = run_forest(&config).unwrap();

    assert_eq!(first.test_ids, second.test_ids);
    assert_eq!(first.predictions, second.predictions);
    assert_eq!(first.evaluation, second.evaluation);
}

#[test]
fn test_scaler_fitted_on_training_rows_only() {
    let records = derived_records();
    let outcome = run_forest(&ClassifierConfig::default()).unwrap();

    let features = feature_matrix(&records).unwrap();
    let rows_of = |ids: &[u32]| ids.iter().map(|id| *id as usize - 1).collect::<Vec<_>>();
    let train = features.select(&rows_of(&outcome.train_ids));
    let test = features.select(&rows_of(&outcome.test_ids));

    assert_eq!(outcome.scaler, StandardScaler.fit(&train).unwrap());
    assert_ne!(outcome.scaler, StandardScaler.fit(&test).unwrap());
}

#[test]
fn test_evaluation_invariants() {
    let outcome = run_forest(&ClassifierConfig::default()).unwrap();
    let evaluation = &outcome.evaluation;

    assert!((0.0..=1.0).contains(&evaluation.accuracy));

    // Confusion axis covers all grades in the dataset
    assert_eq!(evaluation.confusion.labels, Grade::ALL.to_vec());
    for (i, grade) in evaluation.confusion.labels.iter().enumerate() {
        let expected = outcome.y_test.iter().filter(|g| *g == grade).count();
        assert_eq!(evaluation.confusion.row_sum(i), expected, "row {}", grade);
    }
    assert_eq!(evaluation.confusion.total(), outcome.y_test.len());

    assert_eq!(evaluation.importances.len(), 5);
    let total: f64 = evaluation.importances.iter().map(|f| f.importance).sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert!(evaluation.importances.iter().all(|f| f.importance >= 0.0));
    assert!(evaluation
        .importances
        .windows(2)
        .all(|w| w[0].importance >= w[1].importance));
}

#[test]
fn test_fake_classifier_behind_trait() {
    let records = derived_records();
    let config = ClassifierConfig::default();
    let mut fake = ConstantClassifier::predicting(Grade::B);
    let scaler = CountingScaler::default();

    let outcome = run_classifier(&records, &config, &mut fake, &scaler).unwrap();

    assert_eq!(scaler.fits.get(), 1);
    assert_eq!(fake.fitted_rows.len(), 10);
    assert!(outcome.predictions.iter().all(|g| *g == Grade::B));

    let b_share = outcome.y_test.iter().filter(|g| **g == Grade::B).count() as f64
        / outcome.y_test.len() as f64;
    assert!((outcome.evaluation.accuracy - b_share).abs() < 1e-12);

    // No importances from the fake, so every feature gets an equal share
    let importances: Vec<f64> = outcome
        .evaluation
        .importances
        .iter()
        .map(|f| f.importance)
        .collect();
    assert_eq!(importances, uniform_importances(5));
    assert_eq!(outcome.evaluation.importances[0].feature, "math");
}

#[test]
fn test_shuffle_split_can_hold_out_unseen_grade() {
    // Only one D student, so a plain shuffle sometimes tests on it
    let mut records = derived_records();
    records.retain(|r| r.name != "Noah Garcia");

    let mut unseen = 0;
    for seed in 0..50 {
        let config = ClassifierConfig {
            seed,
            n_trees: 5,
            split: SplitStrategy::Shuffle,
            ..ClassifierConfig::default()
        };
        let mut fake = ConstantClassifier::predicting(Grade::A);
        match run_classifier(&records, &config, &mut fake, &StandardScaler) {
            Ok(_) => {}
            Err(err) => {
                assert_eq!(err.stage(), Some(Stage::Evaluate));
                if let AnalysisError::UnseenLabel(grade) = err.root() {
                    if *grade == Grade::D {
                        unseen += 1;
                    }
                } else {
                    panic!("unexpected error: {}", err.root());
                }
            }
        }
    }
    assert!(unseen > 0);
}

#[test]
fn test_stratified_split_keeps_singleton_in_training() {
    let mut records = derived_records();
    records.retain(|r| r.name != "Noah Garcia");

    for seed in 0..20 {
        let config = ClassifierConfig {
            seed,
            ..ClassifierConfig::default()
        };
        let mut fake = ConstantClassifier::predicting(Grade::A);
        let outcome = run_classifier(&records, &config, &mut fake, &StandardScaler).unwrap();
        assert!(!outcome.y_test.contains(&Grade::D));
    }
}

#[test]
fn test_invalid_test_size_fails_at_split() {
    let config = ClassifierConfig {
        test_size: 1.0,
        ..ClassifierConfig::default()
    };
    let err = run_forest(&config).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Split));
    assert!(matches!(err.root(), AnalysisError::InvalidTestSize(_)));
    assert_eq!(err.to_string(), "Split stage failed");
}

#[test]
fn test_single_tree_is_a_decision_tree() {
    let config = ClassifierConfig {
        n_trees: 1,
        ..ClassifierConfig::default()
    };
    let mut forest = RandomForest::new(config.forest_config());
    run_classifier(&derived_records(), &config, &mut forest, &StandardScaler).unwrap();

    let trees: &[DecisionTree] = forest.trees();
    assert_eq!(trees.len(), 1);
    assert!(trees[0].node_count() >= 1);
}
