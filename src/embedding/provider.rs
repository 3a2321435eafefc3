//! Embedding provider capability and provider selection.

use super::HashEmbedder;
use crate::config::EmbeddingConfig;
use crate::error::{MdbedError, ProviderError, Result};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Result type for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Maps text to fixed-length vectors.
///
/// Implementations must be deterministic for equal input; the embedding cache
/// relies on it and does not re-validate.
///
/// # Example
///
/// ```
/// use mdbed::embedding::{EmbeddingProvider, HashEmbedder};
///
/// let provider = HashEmbedder::new(64);
/// let v = provider.embed("fn main() {}").unwrap();
/// assert_eq!(v.len(), provider.dimension());
/// ```
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> ProviderResult<Vec<f32>>;

    /// Embed several texts in one call.
    ///
    /// Default implementation calls `embed` for each text.
    fn embed_batch(&self, texts: &[&str]) -> ProviderResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Dimension of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Model identifier, used to invalidate persisted caches.
    fn model_name(&self) -> &str;
}

/// A provider that never computes.
///
/// Only embeddings already present in the cache can take part in
/// similarity matching; every miss is reported as unavailable.
#[derive(Debug, Clone)]
pub struct CachedOnlyProvider {
    model: String,
    dimension: usize,
}

impl CachedOnlyProvider {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
        }
    }
}

impl EmbeddingProvider for CachedOnlyProvider {
    fn embed(&self, _text: &str) -> ProviderResult<Vec<f32>> {
        Err(ProviderError::NotCached)
    }

    fn embed_batch(&self, _texts: &[&str]) -> ProviderResult<Vec<Vec<f32>>> {
        Err(ProviderError::NotCached)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Which provider implementation to construct.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Built-in deterministic feature-hashing embedder
    #[default]
    Hash,
    /// OpenAI-compatible HTTP embedding endpoint
    Http,
    /// Use persisted embeddings only, never compute
    CachedOnly,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash => write!(f, "hash"),
            Self::Http => write!(f, "http"),
            Self::CachedOnly => write!(f, "cached-only"),
        }
    }
}

/// Construct the provider selected by configuration.
pub fn build_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    if config.dimension == 0 {
        return Err(MdbedError::config("embedding.dimension must be at least 1"));
    }

    let provider: Box<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::Hash => Box::new(HashEmbedder::new(config.dimension)),
        ProviderKind::CachedOnly => {
            Box::new(CachedOnlyProvider::new(&config.model, config.dimension))
        }
        ProviderKind::Http => build_http(config)?,
    };

    tracing::debug!(
        provider = %config.provider,
        model = provider.model_name(),
        dimension = provider.dimension(),
        "embedding provider ready"
    );
    Ok(provider)
}

#[cfg(feature = "remote")]
fn build_http(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    Ok(Box::new(super::HttpEmbeddingProvider::from_config(config)?))
}

#[cfg(not(feature = "remote"))]
fn build_http(_config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    Err(MdbedError::config(
        "the http provider requires mdbed to be built with the `remote` feature",
    ))
}
