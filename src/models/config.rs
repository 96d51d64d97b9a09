//! Configuration model loaded from external sources.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::result::DecisionThresholds;
use crate::processing::embedding::{
    DEFAULT_MODEL_NAME, EmbeddingError, EmbeddingProvider, FastEmbedProvider, HASHING_MODEL_NAME,
    HashingEmbedder, embedding_model_from_name,
};
use crate::processing::matcher::EquivalencyMatcher;

/// Default location of the optional YAML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

/// Environment variable prefix, e.g. `EQUIVALENCY_DATABASE_URL` or
/// `EQUIVALENCY_EMBEDDING__MODEL`.
pub const ENV_PREFIX: &str = "EQUIVALENCY";

#[derive(Clone, Debug, Deserialize)]
/// Embedding capability settings.
pub struct EmbeddingConfig {
    pub model: String,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Vector size of the hashing provider; ignored by fastembed models.
    #[serde(default)]
    pub dimensions: Option<usize>,
    #[serde(default)]
    pub cache_catalog: bool,
}

impl EmbeddingConfig {
    /// Build the configured provider. Models are not loaded until first use.
    pub fn build_provider(&self) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
        if self.model == HASHING_MODEL_NAME {
            let embedder = match self.dimensions {
                Some(dimensions) => HashingEmbedder::new(dimensions),
                None => HashingEmbedder::default(),
            };
            return Ok(Arc::new(embedder));
        }

        let mut provider = FastEmbedProvider::new(embedding_model_from_name(&self.model)?);
        if let Some(cache_dir) = &self.cache_dir {
            provider = provider.with_cache_dir(cache_dir.clone());
        }
        if let Some(batch_size) = self.batch_size {
            provider = provider.with_batch_size(batch_size);
        }
        Ok(Arc::new(provider))
    }
}

#[derive(Clone, Debug, Deserialize)]
/// Settings of the comparison worker.
pub struct ServerConfig {
    pub database_url: String,
    pub zmq_address: String,
    #[serde(default)]
    pub zmq_results_address: Option<String>,
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub thresholds: DecisionThresholds,
}

impl ServerConfig {
    /// Load defaults, then `EQUIVALENCY_CONFIG` (or [`DEFAULT_CONFIG_PATH`]),
    /// then `EQUIVALENCY_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(format!("{ENV_PREFIX}_CONFIG"))
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load with `path` as the YAML layer. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("database_url", "app.db")?
            .set_default("zmq_address", "tcp://127.0.0.1:5556")?
            .set_default("embedding.model", DEFAULT_MODEL_NAME)?
            .set_default("embedding.cache_catalog", false)?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Self>()?;

        if !config.thresholds.is_ordered() {
            return Err(ConfigError::Message(format!(
                "invalid thresholds: partial ({}) must not exceed accepted ({})",
                config.thresholds.partial, config.thresholds.accepted
            )));
        }

        Ok(config)
    }

    /// Assemble a matcher from the embedding and threshold settings.
    pub fn build_matcher(&self) -> Result<EquivalencyMatcher, EmbeddingError> {
        let matcher = EquivalencyMatcher::new(self.embedding.build_provider()?)
            .with_thresholds(self.thresholds);

        Ok(if self.embedding.cache_catalog {
            matcher.with_catalog_cache()
        } else {
            matcher
        })
    }
}
