use crate::models::ModelMetrics;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when reading the metrics artifact
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to read metrics artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed metrics artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reader for the metrics artifact written by the offline training run.
///
/// The file is re-read on every [`load`](MetricsStore::load): the training
/// process may replace it at any time, so nothing is cached here.
#[derive(Debug, Clone)]
pub struct MetricsStore {
    path: PathBuf,
}

impl MetricsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the artifact.
    ///
    /// Returns `Ok(None)` when the file does not exist yet (no training run).
    pub fn load(&self) -> Result<Option<ModelMetrics>, MetricsError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No metrics artifact at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(MetricsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let metrics = ModelMetrics::from_json_str(&raw).map_err(|source| MetricsError::Parse {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            "Loaded metrics for {} models from {} (best: {:?})",
            metrics.models.len(),
            self.path.display(),
            metrics.best_model
        );

        Ok(Some(metrics))
    }
}
