//! Persisted model artifact and its lazily-loaded in-memory cache

use crate::encoding::EncodingTable;
use crate::error::Result;
use crate::models::TrainedRegressor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// The trained model, its encoding tables and the feature-column order,
/// persisted and loaded as one unit.
///
/// The encodings are not self-describing, so the regression model must
/// never be loaded without its paired table; bundling them in one file
/// makes the invalid state unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// The selected trained regressor
    pub model: TrainedRegressor,
    /// Season/weekday/category codes built at training time
    pub encodings: EncodingTable,
    /// Feature-column order used at training time
    pub feature_columns: Vec<String>,
    /// When the artifact was produced
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Persist the artifact as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load an artifact persisted with [`save`]
    ///
    /// [`save`]: ModelArtifact::save
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let artifact = serde_json::from_str(&json)?;
        Ok(artifact)
    }
}

/// Lazily-loaded, process-wide artifact cache.
///
/// The first `get` loads the artifact from disk under a lock, so concurrent
/// first-time callers never race into duplicate or partial loads; later
/// calls hand out cheap clones of the shared `Arc`. The cached artifact is
/// read-only and safe to share across concurrent forecast requests.
#[derive(Debug)]
pub struct ArtifactStore {
    path: PathBuf,
    cached: Mutex<Option<Arc<ModelArtifact>>>,
}

impl ArtifactStore {
    /// Create a store over an artifact file; nothing is loaded yet
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    /// Get the artifact, loading it from disk on first use
    pub fn get(&self) -> Result<Arc<ModelArtifact>> {
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(artifact) = cached.as_ref() {
            return Ok(Arc::clone(artifact));
        }

        tracing::info!(path = %self.path.display(), "loading model artifact");
        let artifact = Arc::new(ModelArtifact::load(&self.path)?);
        *cached = Some(Arc::clone(&artifact));
        Ok(artifact)
    }

    /// Replace the cached artifact, e.g. after a retraining run
    pub fn replace(&self, artifact: ModelArtifact) -> Arc<ModelArtifact> {
        let shared = Arc::new(artifact);
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cached = Some(Arc::clone(&shared));
        shared
    }
}
