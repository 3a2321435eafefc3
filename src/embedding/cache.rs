//! Fingerprint-keyed embedding cache.

use super::provider::EmbeddingProvider;
use super::Embedding;
use crate::addressing::Fingerprint;
use crate::error::{MdbedError, ProviderError, Result};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default number of texts per provider batch.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Outcome of a batched fetch, keyed by fingerprint.
pub type BatchOutcome = HashMap<Fingerprint, std::result::Result<Embedding, ProviderError>>;

/// Cooperative cancellation flag shared between a caller and a comparison.
///
/// Checked before every provider batch.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Statistics for cache performance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Distinct fingerprints looked up
    pub lookups: u64,
    /// Lookups served from memory
    pub hits: u64,
    /// Lookups that needed the provider
    pub misses: u64,
    /// Provider invocations (a batch counts once, as does each single retry)
    pub provider_calls: u64,
    /// Fingerprints whose embedding could not be obtained
    pub failures: u64,
}

impl CacheStats {
    /// Get the cache hit rate.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    lookups: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    provider_calls: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }
}

/// Thread-safe memo of fingerprint → embedding.
///
/// Entries are write-once: a second insert for a fingerprint that is already
/// present keeps the stored value. Failed fetches are never cached, so a
/// later comparison retries them.
///
/// The cache remembers the model it was populated with; binding it to a
/// provider with a different model or dimension is a configuration error.
#[derive(Debug)]
pub struct EmbeddingCache {
    entries: RwLock<HashMap<Fingerprint, Embedding>>,
    model: RwLock<Option<(String, usize)>>,
    counters: Counters,
    batch_size: usize,
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingCache {
    /// Create an empty, unbound cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            model: RwLock::new(None),
            counters: Counters::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Create a cache pre-populated with entries for a known model.
    pub fn with_entries(
        model: impl Into<String>,
        dimension: usize,
        entries: impl IntoIterator<Item = (Fingerprint, Vec<f32>)>,
    ) -> Self {
        let cache = Self::new();
        *cache.model.write().unwrap_or_else(PoisonError::into_inner) = Some((model.into(), dimension));
        {
            let mut map = cache.write_entries();
            for (fp, vector) in entries {
                if vector.len() == dimension {
                    map.entry(fp).or_insert_with(|| Arc::from(vector));
                }
            }
        }
        cache
    }

    /// Set the number of texts sent per provider batch (at least 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Model and dimension the cached vectors belong to, once bound.
    #[must_use]
    pub fn model(&self) -> Option<(String, usize)> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bind the cache to a provider, or verify an existing binding.
    ///
    /// Fails with a configuration error when the cache already holds
    /// vectors from a different model or of a different dimension.
    pub fn bind(&self, provider: &dyn EmbeddingProvider) -> Result<()> {
        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        match model.as_ref() {
            None => {
                *model = Some((provider.model_name().to_string(), provider.dimension()));
                Ok(())
            }
            Some((name, dimension)) => {
                if name != provider.model_name() {
                    return Err(MdbedError::config(format!(
                        "embedding cache holds vectors for model '{name}', provider is '{}'",
                        provider.model_name()
                    )));
                }
                if *dimension != provider.dimension() {
                    return Err(MdbedError::config(format!(
                        "embedding cache holds {dimension}-dimensional vectors, provider returns {}",
                        provider.dimension()
                    )));
                }
                Ok(())
            }
        }
    }

    /// Look up an embedding without touching the provider or the statistics.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Embedding> {
        self.read_entries().get(fingerprint).cloned()
    }

    /// Store a vector. Returns the value now held for the fingerprint, which
    /// is the earlier one if the slot was already filled.
    pub fn insert(&self, fingerprint: Fingerprint, vector: Vec<f32>) -> Embedding {
        let mut entries = self.write_entries();
        Arc::clone(entries.entry(fingerprint).or_insert_with(|| Arc::from(vector)))
    }

    /// Return the cached embedding or compute it with one provider call.
    pub fn get_or_compute(
        &self,
        fingerprint: Fingerprint,
        content: &str,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Embedding> {
        Counters::add(&self.counters.lookups, 1);
        if let Some(hit) = self.get(&fingerprint) {
            Counters::add(&self.counters.hits, 1);
            return Ok(hit);
        }
        Counters::add(&self.counters.misses, 1);
        Counters::add(&self.counters.provider_calls, 1);

        let result = provider
            .embed(content)
            .and_then(|v| check_dimension(v, provider.dimension()));
        match result {
            Ok(vector) => Ok(self.insert(fingerprint, vector)),
            Err(source) => {
                Counters::add(&self.counters.failures, 1);
                Err(MdbedError::EmbeddingUnavailable {
                    fingerprint,
                    source,
                })
            }
        }
    }

    /// Fetch embeddings for many segments.
    ///
    /// Fingerprints are deduplicated first, so each distinct fingerprint is
    /// requested once. Misses are sent in batches that run in parallel; a
    /// rejected batch falls back to one call per text. The token is checked before each batch; if it fires, the
    /// call returns [`MdbedError::Cancelled`] and only complete entries
    /// written so far remain in the cache.
    pub fn get_or_compute_batch(
        &self,
        items: &[(Fingerprint, &str)],
        provider: &dyn EmbeddingProvider,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome> {
        let unique: IndexMap<Fingerprint, &str> = items.iter().copied().collect();
        Counters::add(&self.counters.lookups, unique.len());

        let mut outcome: BatchOutcome = HashMap::with_capacity(unique.len());
        let mut missing: Vec<(Fingerprint, &str)> = Vec::new();
        {
            let entries = self.read_entries();
            for (fp, content) in &unique {
                match entries.get(fp) {
                    Some(hit) => {
                        outcome.insert(*fp, Ok(Arc::clone(hit)));
                    }
                    None => missing.push((*fp, *content)),
                }
            }
        }
        Counters::add(&self.counters.hits, outcome.len());
        Counters::add(&self.counters.misses, missing.len());

        if missing.is_empty() {
            return Ok(outcome);
        }

        let dimension = provider.dimension();
        let fetched: Vec<Option<Vec<(Fingerprint, std::result::Result<Embedding, ProviderError>)>>> =
            missing
                .par_chunks(self.batch_size)
                .map(|chunk| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    Some(self.fetch_chunk(chunk, provider, dimension))
                })
                .collect();

        if fetched.iter().any(Option::is_none) {
            tracing::info!("comparison cancelled while fetching embeddings");
            return Err(MdbedError::Cancelled);
        }

        for (fp, result) in fetched.into_iter().flatten().flatten() {
            if let Err(err) = &result {
                tracing::warn!(fingerprint = %fp.short(), error = %err, "embedding unavailable");
            }
            outcome.insert(fp, result);
        }

        tracing::debug!(
            requested = items.len(),
            distinct = unique.len(),
            fetched = missing.len(),
            "embedding batch complete"
        );
        Ok(outcome)
    }

    /// Embed one chunk of misses.
    ///
    /// A rejected batch is retried text by text so that only the texts the
    /// provider actually fails on become unavailable. Timeouts and cache-only
    /// misses fail the whole chunk without a retry.
    fn fetch_chunk(
        &self,
        chunk: &[(Fingerprint, &str)],
        provider: &dyn EmbeddingProvider,
        dimension: usize,
    ) -> Vec<(Fingerprint, std::result::Result<Embedding, ProviderError>)> {
        Counters::add(&self.counters.provider_calls, 1);
        let texts: Vec<&str> = chunk.iter().map(|(_, c)| *c).collect();
        let err = match provider.embed_batch(&texts) {
            Ok(vectors) if vectors.len() == chunk.len() => {
                return chunk
                    .iter()
                    .zip(vectors)
                    .map(|((fp, _), vector)| (*fp, self.store_vector(*fp, vector, dimension)))
                    .collect();
            }
            Ok(vectors) => ProviderError::CountMismatch {
                expected: chunk.len(),
                actual: vectors.len(),
            },
            Err(err) => err,
        };

        if chunk.len() == 1 || matches!(err, ProviderError::Timeout(_) | ProviderError::NotCached) {
            return self.fail_all(chunk, &err);
        }

        tracing::debug!(size = chunk.len(), error = %err, "batch rejected, embedding texts one by one");
        chunk
            .iter()
            .map(|(fp, content)| {
                Counters::add(&self.counters.provider_calls, 1);
                let result = match provider.embed(content) {
                    Ok(vector) => self.store_vector(*fp, vector, dimension),
                    Err(err) => {
                        Counters::add(&self.counters.failures, 1);
                        Err(err)
                    }
                };
                (*fp, result)
            })
            .collect()
    }

    fn store_vector(
        &self,
        fingerprint: Fingerprint,
        vector: Vec<f32>,
        dimension: usize,
    ) -> std::result::Result<Embedding, ProviderError> {
        let result = check_dimension(vector, dimension).map(|v| self.insert(fingerprint, v));
        if result.is_err() {
            Counters::add(&self.counters.failures, 1);
        }
        result
    }

    fn fail_all(
        &self,
        chunk: &[(Fingerprint, &str)],
        err: &ProviderError,
    ) -> Vec<(Fingerprint, std::result::Result<Embedding, ProviderError>)> {
        Counters::add(&self.counters.failures, chunk.len());
        chunk.iter().map(|(fp, _)| (*fp, Err(err.clone()))).collect()
    }

    /// Snapshot of all entries, sorted by fingerprint.
    #[must_use]
    pub fn entries(&self) -> Vec<(Fingerprint, Embedding)> {
        let entries = self.read_entries();
        let mut all: Vec<_> = entries.iter().map(|(k, v)| (*k, Arc::clone(v))).collect();
        all.sort_by_key(|(fp, _)| *fp);
        all
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let c = &self.counters;
        CacheStats {
            lookups: c.lookups.load(Ordering::Relaxed),
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            provider_calls: c.provider_calls.load(Ordering::Relaxed),
            failures: c.failures.load(Ordering::Relaxed),
        }
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    // Entries are write-once, so a writer that panicked cannot leave a
    // half-updated vector behind.
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<Fingerprint, Embedding>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<Fingerprint, Embedding>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_dimension(vector: Vec<f32>, expected: usize) -> std::result::Result<Vec<f32>, ProviderError> {
    if vector.len() == expected {
        Ok(vector)
    } else {
        Err(ProviderError::DimensionMismatch {
            expected,
            actual: vector.len(),
        })
    }
}
