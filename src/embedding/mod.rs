//! Embedding providers and the fingerprint-keyed embedding cache.
//!
//! Providers are interchangeable implementations of [`EmbeddingProvider`]
//! chosen by configuration:
//!
//! - [`HashEmbedder`]: built-in, deterministic, offline
//! - `HttpEmbeddingProvider`: OpenAI-compatible endpoint (feature `remote`)
//! - [`CachedOnlyProvider`]: never computes, only persisted vectors match
//!
//! The [`EmbeddingCache`] memoizes vectors by content fingerprint so the same
//! content is embedded at most once, whichever document it appears in.
//! [`CacheStore`] persists it between runs.

mod cache;
mod hash;
#[cfg(feature = "remote")]
mod http;
mod provider;
mod store;

pub use cache::{BatchOutcome, CacheStats, CancellationToken, EmbeddingCache, DEFAULT_BATCH_SIZE};
pub use hash::{HashEmbedder, HASH_MODEL_NAME};
#[cfg(feature = "remote")]
pub use http::HttpEmbeddingProvider;
pub use provider::{build_provider, CachedOnlyProvider, EmbeddingProvider, ProviderKind, ProviderResult};
pub use store::{CacheStore, StoreInfo, STORE_FILE_NAME, STORE_FORMAT_VERSION};

use std::sync::Arc;

/// Shared, immutable embedding vector.
pub type Embedding = Arc<[f32]>;
