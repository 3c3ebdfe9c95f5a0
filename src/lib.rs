//! Insight Engine - scoring and aggregation engine for the career insights platform
//!
//! This library provides the two analytical components behind the platform:
//! a weighted keyword scorer that rates resume text against a role taxonomy,
//! and an aggregator that combines per-model salary estimates into a single
//! recommendation using offline model metrics.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    aggregate, aggregate_with_selection, score_resume, AggregateError, CategoryWeights, KeywordCategory,
    KeywordScorer, PredictionAggregator, RoleTaxonomy, TaxonomyError,
};
pub use crate::models::{AggregatedPrediction, MatchResult, ModelEstimate, ModelMetrics, ModelRmse, ModelSummary};
pub use crate::services::{MetricsError, MetricsStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let result = KeywordScorer::default().score("data scientist", "python");
        assert_eq!(result.matched_keywords, vec!["python"]);
    }
}
