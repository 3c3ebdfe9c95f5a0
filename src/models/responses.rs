use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::models::domain::ModelRmse;

/// Dashboard view of the metrics artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    #[serde(rename = "bestModel")]
    pub best_model: Option<String>,
    /// Model identifiers ordered by ascending test RMSE
    pub ranking: Vec<String>,
    pub metrics: BTreeMap<String, ModelRmse>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
