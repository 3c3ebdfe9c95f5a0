use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-model salary estimates, keyed by model identifier
/// (e.g. `linear_regression`, `random_forest`, `gradient_boosting`).
pub type ModelEstimate = BTreeMap<String, f64>;

/// Result of scoring a resume against a role taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Weighted match percentage in [0, 100]
    pub score: u8,
    #[serde(rename = "matchedKeywords")]
    pub matched_keywords: Vec<String>,
    #[serde(rename = "missingKeywords")]
    pub missing_keywords: Vec<String>,
}

impl MatchResult {
    /// Zero-score result with no keywords, returned for unknown roles
    pub fn empty() -> Self {
        Self {
            score: 0,
            matched_keywords: Vec::new(),
            missing_keywords: Vec::new(),
        }
    }
}

/// Offline accuracy figures for one model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRmse {
    pub rmse_test: f64,
    pub rmse_cv_mean: f64,
    pub rmse_cv_std: f64,
}

impl ModelRmse {
    fn is_valid(&self) -> bool {
        [self.rmse_test, self.rmse_cv_mean, self.rmse_cv_std]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Error raised when a metrics document does not have the expected shape
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MetricsFormatError(String);

/// Metrics artifact produced by the offline training run.
///
/// On disk this is a flat JSON object: one key per model holding its RMSE
/// figures, plus the optional `best_model` and `features` keys alongside them.
/// Any other non-object key is ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ModelMetrics {
    pub models: BTreeMap<String, ModelRmse>,
    pub best_model: Option<String>,
    pub features: Vec<String>,
}

impl ModelMetrics {
    /// Parse a metrics document from its JSON text
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Model with the lowest test RMSE, ties broken by identifier order.
    ///
    /// Informational only: aggregation never substitutes this for a missing
    /// `best_model`.
    pub fn lowest_rmse_model(&self) -> Option<&str> {
        self.ranking().first().copied()
    }

    /// Model identifiers ordered by ascending test RMSE
    pub fn ranking(&self) -> Vec<&str> {
        let mut ranked: Vec<(&str, f64)> = self
            .models
            .iter()
            .map(|(name, rmse)| (name.as_str(), rmse.rmse_test))
            .collect();

        // BTreeMap iteration already orders by name, and the sort is stable
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        ranked.into_iter().map(|(name, _)| name).collect()
    }

    /// High-level view used by dashboards
    pub fn summary(&self) -> super::ModelSummary {
        super::ModelSummary {
            best_model: self.best_model.clone(),
            ranking: self.ranking().into_iter().map(str::to_string).collect(),
            metrics: self.models.clone(),
        }
    }
}

impl TryFrom<Map<String, Value>> for ModelMetrics {
    type Error = MetricsFormatError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut metrics = ModelMetrics::default();

        for (key, value) in raw {
            match key.as_str() {
                "best_model" => {
                    metrics.best_model = match value {
                        Value::Null => None,
                        Value::String(name) => Some(name),
                        other => {
                            return Err(MetricsFormatError(format!(
                                "best_model must be a string, got {}",
                                other
                            )))
                        }
                    };
                }
                "features" => {
                    metrics.features = serde_json::from_value(value).map_err(|e| {
                        MetricsFormatError(format!("features must be a list of strings: {}", e))
                    })?;
                }
                _ if value.is_object() => {
                    let rmse: ModelRmse = serde_json::from_value(value).map_err(|e| {
                        MetricsFormatError(format!("invalid metrics for model {}: {}", key, e))
                    })?;
                    if !rmse.is_valid() {
                        return Err(MetricsFormatError(format!(
                            "RMSE values for model {} must be finite and non-negative",
                            key
                        )));
                    }
                    metrics.models.insert(key, rmse);
                }
                _ => {
                    tracing::trace!("Ignoring non-model key in metrics artifact: {}", key);
                }
            }
        }

        Ok(metrics)
    }
}

impl From<ModelMetrics> for Map<String, Value> {
    fn from(metrics: ModelMetrics) -> Self {
        let mut map = Map::new();

        for (name, rmse) in metrics.models {
            map.insert(
                name,
                serde_json::json!({
                    "rmse_test": rmse.rmse_test,
                    "rmse_cv_mean": rmse.rmse_cv_mean,
                    "rmse_cv_std": rmse.rmse_cv_std,
                }),
            );
        }
        if let Some(best) = metrics.best_model {
            map.insert("best_model".to_string(), Value::String(best));
        }
        if !metrics.features.is_empty() {
            map.insert(
                "features".to_string(),
                Value::Array(metrics.features.into_iter().map(Value::String).collect()),
            );
        }

        map
    }
}

/// Combined salary prediction across all supplied models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPrediction {
    pub per_model: ModelEstimate,
    /// Arithmetic mean of every value in `per_model`
    pub ensemble: f64,
    pub active_model: Option<String>,
    pub active_prediction: Option<f64>,
}

impl AggregatedPrediction {
    /// The number to show as "recommended": the active model's estimate when
    /// one was selected, the ensemble mean otherwise
    pub fn recommended(&self) -> f64 {
        self.active_prediction.unwrap_or(self.ensemble)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"{
        "linear_regression": {"rmse_test": 7100.5, "rmse_cv_mean": 7200.0, "rmse_cv_std": 150.2},
        "random_forest": {"rmse_test": 7400.0, "rmse_cv_mean": 7500.1, "rmse_cv_std": 210.0},
        "gradient_boosting": {"rmse_test": 7250.0, "rmse_cv_mean": 7300.0, "rmse_cv_std": 180.0},
        "best_model": "linear_regression",
        "features": ["years_experience", "education_level", "role_level", "company_size"]
    }"#;

    #[test]
    fn test_parse_training_artifact() {
        let metrics = ModelMetrics::from_json_str(ARTIFACT).unwrap();

        assert_eq!(metrics.models.len(), 3);
        assert_eq!(metrics.best_model.as_deref(), Some("linear_regression"));
        assert_eq!(metrics.features.len(), 4);
        assert_eq!(metrics.models["random_forest"].rmse_test, 7400.0);
    }

    #[test]
    fn test_parse_without_best_model() {
        let metrics =
            ModelMetrics::from_json_str(r#"{"random_forest": {"rmse_test": 1.0, "rmse_cv_mean": 1.0, "rmse_cv_std": 0.1}}"#)
                .unwrap();

        assert!(metrics.best_model.is_none());
        assert!(metrics.features.is_empty());
    }

    #[test]
    fn test_unknown_scalar_keys_ignored() {
        let metrics = ModelMetrics::from_json_str(r#"{"trained_at": "2024-01-01", "version": 3}"#).unwrap();
        assert!(metrics.models.is_empty());
    }

    #[test]
    fn test_rejects_negative_rmse() {
        let result = ModelMetrics::from_json_str(
            r#"{"random_forest": {"rmse_test": -1.0, "rmse_cv_mean": 1.0, "rmse_cv_std": 0.1}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_string_best_model() {
        assert!(ModelMetrics::from_json_str(r#"{"best_model": 42}"#).is_err());
    }

    #[test]
    fn test_ranking_by_test_rmse() {
        let metrics = ModelMetrics::from_json_str(ARTIFACT).unwrap();

        assert_eq!(
            metrics.ranking(),
            vec!["linear_regression", "gradient_boosting", "random_forest"]
        );
        assert_eq!(metrics.lowest_rmse_model(), Some("linear_regression"));
    }

    #[test]
    fn test_serialize_keeps_flat_shape() {
        let metrics = ModelMetrics::from_json_str(ARTIFACT).unwrap();
        let value = serde_json::to_value(&metrics).unwrap();

        assert_eq!(value["best_model"], "linear_regression");
        assert_eq!(value["random_forest"]["rmse_cv_std"], 210.0);
        assert!(value.get("models").is_none());
    }

    #[test]
    fn test_recommended_falls_back_to_ensemble() {
        let prediction = AggregatedPrediction {
            per_model: ModelEstimate::new(),
            ensemble: 600000.0,
            active_model: None,
            active_prediction: None,
        };
        assert_eq!(prediction.recommended(), 600000.0);
    }
}
