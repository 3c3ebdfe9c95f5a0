// Integration tests for Insight Engine

use insight_engine::config::{Settings, TaxonomySettings};
use insight_engine::{KeywordScorer, MetricsStore, ModelEstimate, PredictionAggregator};
use std::io::Write;

const METRICS_ARTIFACT: &str = r#"{
  "linear_regression": {"rmse_test": 7012.4, "rmse_cv_mean": 7101.9, "rmse_cv_std": 240.3},
  "random_forest": {"rmse_test": 7388.1, "rmse_cv_mean": 7420.6, "rmse_cv_std": 198.7},
  "gradient_boosting": {"rmse_test": 7150.0, "rmse_cv_mean": 7233.2, "rmse_cv_std": 205.4},
  "best_model": "linear_regression",
  "features": ["years_experience", "education_level", "role_level", "company_size"]
}"#;

fn create_estimates() -> ModelEstimate {
    [
        ("linear_regression", 92000.0),
        ("random_forest", 98000.0),
        ("gradient_boosting", 95000.0),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

#[test]
fn test_integration_settings_file_to_scorer() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[scoring]
default_category_weight = 0.2

[scoring.category_weights]
core = 0.75

[[taxonomy.roles]]
name = "Embedded Engineer"

[[taxonomy.roles.categories]]
name = "core"
keywords = ["c", "rtos"]

[[taxonomy.roles.categories]]
name = "hardware"
keywords = ["oscilloscope", "spi"]

[metrics]
artifact_path = "/nonexistent/model_metrics.json"
"#
    )
    .unwrap();

    let settings = Settings::load_from(file.path()).unwrap();
    let (taxonomy, weights) = settings.scoring_tables().unwrap();
    let scorer = KeywordScorer::new(taxonomy, weights);

    assert!(scorer.taxonomy().contains_role("embedded engineer"));
    assert!(!scorer.taxonomy().contains_role("data scientist"));

    // core 0.75 fully matched, hardware (default 0.2) half matched: 0.85 / 0.95
    let result = scorer.score("EMBEDDED ENGINEER", "FreeRTOS firmware in C, SPI drivers");
    assert_eq!(result.matched_keywords, vec!["c", "rtos", "spi"]);
    assert_eq!(result.missing_keywords, vec!["oscilloscope"]);
    assert_eq!(result.score, 89);

    let store = MetricsStore::new(&settings.metrics.artifact_path);
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_integration_prediction_with_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_metrics.json");
    std::fs::write(&path, METRICS_ARTIFACT).unwrap();

    let store = MetricsStore::new(&path);
    let metrics = store.load().unwrap();
    let prediction = PredictionAggregator::new()
        .aggregate(create_estimates(), metrics.as_ref())
        .unwrap();

    assert_eq!(prediction.active_model.as_deref(), Some("linear_regression"));
    assert_eq!(prediction.active_prediction, Some(92000.0));
    assert!((prediction.ensemble - 95000.0).abs() < 1e-6);
    assert_eq!(prediction.recommended(), 92000.0);
}

#[test]
fn test_integration_prediction_before_training() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetricsStore::new(dir.path().join("model_metrics.json"));

    let metrics = store.load().unwrap();
    let prediction = PredictionAggregator::new()
        .aggregate(create_estimates(), metrics.as_ref())
        .unwrap();

    assert!(prediction.active_model.is_none());
    assert!(prediction.active_prediction.is_none());
    assert!((prediction.recommended() - 95000.0).abs() < 1e-6);
}

#[test]
fn test_integration_retrained_artifact_drops_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_metrics.json");
    let store = MetricsStore::new(&path);

    std::fs::write(&path, METRICS_ARTIFACT).unwrap();
    let first = PredictionAggregator::new()
        .aggregate(create_estimates(), store.load().unwrap().as_ref())
        .unwrap();
    assert_eq!(first.active_model.as_deref(), Some("linear_regression"));

    // A newer training run promotes a model the live estimates do not include
    std::fs::write(&path, r#"{"best_model": "xgboost"}"#).unwrap();
    let second = PredictionAggregator::new()
        .aggregate(create_estimates(), store.load().unwrap().as_ref())
        .unwrap();
    assert!(second.active_model.is_none());
}

#[test]
fn test_integration_dashboard_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_metrics.json");
    std::fs::write(&path, METRICS_ARTIFACT).unwrap();

    let summary = MetricsStore::new(&path).load().unwrap().unwrap().summary();

    assert_eq!(summary.best_model.as_deref(), Some("linear_regression"));
    assert_eq!(
        summary.ranking,
        vec!["linear_regression", "gradient_boosting", "random_forest"]
    );
    assert_eq!(summary.metrics.len(), 3);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["bestModel"], "linear_regression");
}

#[test]
fn test_integration_result_serialization() {
    let scorer = KeywordScorer::default();
    let result = scorer.score("data analyst", "Excel and SQL");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["matchedKeywords"], serde_json::json!(["excel", "sql"]));
    assert!(json["missingKeywords"].as_array().unwrap().len() > 0);

    let prediction = PredictionAggregator::new()
        .aggregate(create_estimates(), None)
        .unwrap();
    let json = serde_json::to_value(&prediction).unwrap();
    assert!(json["active_model"].is_null());
    assert!(json["active_prediction"].is_null());
    assert_eq!(json["per_model"]["random_forest"], 98000.0);
}

#[test]
fn test_integration_taxonomy_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[roles]]
name = "Data Engineer"

[[roles.categories]]
name = "core"
keywords = ["spark", "airflow", "kafka"]
"#
    )
    .unwrap();

    let taxonomy = TaxonomySettings::from_file(file.path()).unwrap().to_taxonomy();
    let scorer = KeywordScorer::new(taxonomy, Default::default());

    let result = scorer.score("data engineer", "Built Kafka and Spark pipelines");
    assert_eq!(result.matched_keywords, vec!["spark", "kafka"]);
    assert_eq!(result.score, 67);
}
