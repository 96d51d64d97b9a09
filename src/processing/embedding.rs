use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::course::CatalogCourse;
use crate::domain::types::CourseId;

/// Default sentence-transformers model.
pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Model name selecting the offline [`HashingEmbedder`].
pub const HASHING_MODEL_NAME: &str = "hashing";

#[derive(Debug, Error, PartialEq)]
pub enum EmbeddingError {
    #[error("failed to initialize embedding model: {0}")]
    Initialization(String),
    #[error("failed to generate embeddings: {0}")]
    Inference(String),
    #[error("embedding provider returned {found} vectors for {expected} texts")]
    BatchSize { expected: usize, found: usize },
    #[error("embedding has dimension {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("unknown embedding model: {0}")]
    UnknownModel(String),
}

/// Maps text to fixed-length dense vectors.
///
/// Implementations must be deterministic for identical input and keep the
/// dimension constant for their lifetime.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed every text, returning exactly one vector per input in order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        match vectors.len() {
            1 => Ok(vectors.remove(0)),
            found => Err(EmbeddingError::BatchSize { expected: 1, found }),
        }
    }
}

/// Normalize a vector to unit length.
///
/// Returns the original vector when the norm is zero.
pub(crate) fn normalize_embedding(vec: &[f32]) -> Vec<f32> {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        vec.to_vec()
    } else {
        vec.iter().map(|x| x / norm).collect()
    }
}

/// Resolve a configured model name to a fastembed model.
pub fn embedding_model_from_name(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
    match name {
        "all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-MiniLM-L12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        "multilingual-e5-small" => Ok(EmbeddingModel::MultilingualE5Small),
        "multilingual-e5-large" => Ok(EmbeddingModel::MultilingualE5Large),
        other => Err(EmbeddingError::UnknownModel(other.to_string())),
    }
}

/// A model loaded on first use, at most once, behind a mutex.
///
/// Concurrent first callers block until the single load finishes. A failed
/// load leaves the slot empty, so the next call tries again.
pub struct LazyModel<M> {
    slot: Mutex<Option<M>>,
}

impl<M> Default for LazyModel<M> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<M> LazyModel<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    /// Run `use_model` on the model, calling `load` first if it is not loaded
    /// yet. The lock is held for the whole call.
    pub fn with<L, F, R>(&self, load: L, use_model: F) -> Result<R, EmbeddingError>
    where
        L: FnOnce() -> Result<M, EmbeddingError>,
        F: FnOnce(&mut M) -> Result<R, EmbeddingError>,
    {
        let mut guard = self.lock();
        if guard.is_none() {
            *guard = Some(load()?);
        }
        match guard.as_mut() {
            Some(model) => use_model(model),
            None => Err(EmbeddingError::Initialization(
                "model missing after load".to_string(),
            )),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<M>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Local ONNX embeddings through fastembed.
///
/// The model is loaded through a [`LazyModel`]. Inference is serialized on
/// the same mutex because `TextEmbedding` needs exclusive access.
pub struct FastEmbedProvider {
    model: EmbeddingModel,
    cache_dir: Option<PathBuf>,
    batch_size: Option<usize>,
    embedder: LazyModel<TextEmbedding>,
}

impl FastEmbedProvider {
    pub fn new(model: EmbeddingModel) -> Self {
        Self {
            model,
            cache_dir: None,
            batch_size: None,
            embedder: LazyModel::new(),
        }
    }

    /// Directory where model files are downloaded and cached.
    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = Some(cache_dir);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.embedder.is_loaded()
    }

    fn load(&self) -> Result<TextEmbedding, EmbeddingError> {
        log::info!("Loading embedding model {:?}", self.model);

        let mut options = InitOptions::new(self.model.clone());
        if let Some(cache_dir) = &self.cache_dir {
            options = options.with_cache_dir(cache_dir.clone());
        }

        let embedder = TextEmbedding::try_new(options).map_err(|error| {
            log::error!("Failed to initialize embedder {:?}: {error:?}", self.model);
            EmbeddingError::Initialization(error.to_string())
        })?;

        log::info!("Embedding model {:?} loaded", self.model);
        Ok(embedder)
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.embedder.with(
            || self.load(),
            |embedder| {
                embedder
                    .embed(texts.to_vec(), self.batch_size)
                    .map_err(|error| EmbeddingError::Inference(format!("{error:?}")))
            },
        )?;

        Ok(vectors
            .iter()
            .map(|vector| normalize_embedding(vector))
            .collect())
    }
}

/// Deterministic bag-of-words embeddings via feature hashing.
///
/// Each whitespace-separated token increments the bucket selected by the
/// SHA-256 of the token. Needs no model files, so it serves offline runs and
/// tests. Texts sharing no tokens are orthogonal.
#[derive(Clone, Debug)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut prefix = [0_u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(prefix) % self.dimensions as u64) as usize
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        for token in text.split_whitespace() {
            vector[self.bucket(token)] += 1.0;
        }
        normalize_embedding(&vector)
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

struct CachedEmbedding {
    digest: [u8; 32],
    vector: Vec<f32>,
}

/// Catalog embeddings keyed by course id and description digest.
///
/// An entry is reused only while the course description is unchanged, so
/// cached and freshly computed scores are identical.
#[derive(Default)]
pub struct CatalogEmbeddingCache {
    entries: Mutex<HashMap<CourseId, CachedEmbedding>>,
}

impl CatalogEmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return one vector per course, embedding all misses in a single batch.
    ///
    /// `prepare` turns a course into the text handed to the provider.
    pub fn resolve<F>(
        &self,
        courses: &[CatalogCourse],
        provider: &dyn EmbeddingProvider,
        prepare: F,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError>
    where
        F: Fn(&CatalogCourse) -> String,
    {
        let digests: Vec<[u8; 32]> = courses
            .iter()
            .map(|course| description_digest(&course.description))
            .collect();

        let mut resolved: Vec<Option<Vec<f32>>> = {
            let entries = self.lock();
            courses
                .iter()
                .zip(&digests)
                .map(|(course, digest)| {
                    entries
                        .get(&course.id)
                        .filter(|entry| &entry.digest == digest)
                        .map(|entry| entry.vector.clone())
                })
                .collect()
        };

        let missing: Vec<usize> = resolved
            .iter()
            .enumerate()
            .filter(|(_, vector)| vector.is_none())
            .map(|(index, _)| index)
            .collect();

        log::debug!(
            "Catalog embedding cache: hits={}, misses={}",
            courses.len() - missing.len(),
            missing.len()
        );

        if !missing.is_empty() {
            let texts: Vec<String> = missing.iter().map(|&index| prepare(&courses[index])).collect();
            let vectors = provider.embed_batch(&texts)?;
            if vectors.len() != texts.len() {
                return Err(EmbeddingError::BatchSize {
                    expected: texts.len(),
                    found: vectors.len(),
                });
            }

            let mut entries = self.lock();
            for (&index, vector) in missing.iter().zip(vectors) {
                entries.insert(
                    courses[index].id,
                    CachedEmbedding {
                        digest: digests[index],
                        vector: vector.clone(),
                    },
                );
                resolved[index] = Some(vector);
            }
        }

        Ok(resolved.into_iter().flatten().collect())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CourseId, CachedEmbedding>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn description_digest(description: &str) -> [u8; 32] {
    Sha256::digest(description.as_bytes()).into()
}
