// Model exports
pub mod domain;
pub mod responses;

pub use domain::{MatchResult, ModelEstimate, ModelRmse, ModelMetrics, MetricsFormatError, AggregatedPrediction};
pub use responses::{ModelSummary, ErrorResponse};
