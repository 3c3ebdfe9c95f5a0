use crate::models::{AggregatedPrediction, ModelEstimate, ModelMetrics};
use thiserror::Error;

/// Errors that can occur while aggregating model estimates
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Combine per-model salary estimates into a single prediction
///
/// `ensemble` is the mean over exactly the supplied models. The active model
/// is the metrics artifact's `best_model` when it is present in `estimates`;
/// otherwise no model is active and callers fall back to the ensemble.
pub fn aggregate(
    estimates: ModelEstimate,
    metrics: Option<&ModelMetrics>,
) -> Result<AggregatedPrediction, AggregateError> {
    aggregate_with_selection(estimates, metrics, None)
}

/// Like [`aggregate`], but an explicitly requested model that exists in
/// `estimates` takes precedence over the metrics artifact's choice
pub fn aggregate_with_selection(
    estimates: ModelEstimate,
    metrics: Option<&ModelMetrics>,
    requested_model: Option<&str>,
) -> Result<AggregatedPrediction, AggregateError> {
    validate_estimates(&estimates)?;

    let ensemble = running_mean(estimates.values().copied());

    let active_model = select_active_model(&estimates, metrics, requested_model);
    let active_prediction = active_model
        .as_ref()
        .and_then(|name| estimates.get(name).copied());

    tracing::debug!(
        "Aggregated {} model estimates: ensemble={:.2}, active_model={:?}",
        estimates.len(),
        ensemble,
        active_model
    );

    Ok(AggregatedPrediction {
        per_model: estimates,
        ensemble,
        active_model,
        active_prediction,
    })
}

fn validate_estimates(estimates: &ModelEstimate) -> Result<(), AggregateError> {
    if estimates.is_empty() {
        return Err(AggregateError::InvalidInput(
            "at least one model estimate is required".to_string(),
        ));
    }

    if let Some((name, value)) = estimates
        .iter()
        .find(|(_, value)| !value.is_finite() || **value < 0.0)
    {
        return Err(AggregateError::InvalidInput(format!(
            "estimate for model '{}' must be a finite non-negative number, got {}",
            name, value
        )));
    }

    Ok(())
}

/// Incremental mean, stays finite for any finite non-negative inputs
fn running_mean(values: impl Iterator<Item = f64>) -> f64 {
    values
        .enumerate()
        .fold(0.0, |mean, (i, value)| mean + (value - mean) / (i + 1) as f64)
}

fn select_active_model(
    estimates: &ModelEstimate,
    metrics: Option<&ModelMetrics>,
    requested_model: Option<&str>,
) -> Option<String> {
    if let Some(requested) = requested_model {
        if estimates.contains_key(requested) {
            return Some(requested.to_string());
        }
        tracing::debug!("Requested model '{}' has no estimate, ignoring", requested);
    }

    let best_model = metrics?.best_model.as_deref()?;

    if estimates.contains_key(best_model) {
        Some(best_model.to_string())
    } else {
        // Metrics come from an independently versioned training run
        tracing::warn!(
            "Metrics artifact names best model '{}' which has no estimate, no active model",
            best_model
        );
        None
    }
}

/// Stateless aggregator entry point
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionAggregator;

impl PredictionAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(
        &self,
        estimates: ModelEstimate,
        metrics: Option<&ModelMetrics>,
    ) -> Result<AggregatedPrediction, AggregateError> {
        aggregate(estimates, metrics)
    }

    pub fn aggregate_with_selection(
        &self,
        estimates: ModelEstimate,
        metrics: Option<&ModelMetrics>,
        requested_model: Option<&str>,
    ) -> Result<AggregatedPrediction, AggregateError> {
        aggregate_with_selection(estimates, metrics, requested_model)
    }
}
