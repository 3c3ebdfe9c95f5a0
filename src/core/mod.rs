// Core algorithm exports
pub mod aggregator;
pub mod keywords;
pub mod taxonomy;

pub use aggregator::{aggregate, aggregate_with_selection, AggregateError, PredictionAggregator};
pub use keywords::{score_resume, KeywordScorer};
pub use taxonomy::{CategoryWeights, KeywordCategory, RoleTaxonomy, TaxonomyError, DEFAULT_CATEGORY_WEIGHT};
