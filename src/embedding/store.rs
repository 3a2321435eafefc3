//! Persisted embedding cache.
//!
//! The store is a single JSON document:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "model": "hash-v1",
//!   "dimension": 384,
//!   "checksum": "9f0c...",
//!   "entries": { "<32 hex fingerprint>": [0.01, ...] }
//! }
//! ```
//!
//! Loading fails closed: anything that does not validate is discarded and
//! the comparison starts from an empty cache. A store written by a different
//! model is discarded the same way. A store for the same model but another
//! dimension is a configuration error.

use super::EmbeddingCache;
use crate::addressing::Fingerprint;
use crate::error::{MdbedError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::Xxh3;

/// Version of the on-disk layout.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// Default file name inside the cache directory.
pub const STORE_FILE_NAME: &str = "embeddings.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    format_version: u32,
    model: String,
    dimension: usize,
    checksum: String,
    entries: BTreeMap<Fingerprint, Vec<f32>>,
}

/// Summary of a persisted store, for display.
#[derive(Debug, Clone, Serialize)]
pub struct StoreInfo {
    pub path: PathBuf,
    pub model: String,
    pub dimension: usize,
    pub entries: usize,
    pub size_bytes: u64,
}

/// File-backed embedding store.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the user cache directory (`~/.cache/mdbed/embeddings.json`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("mdbed").join(STORE_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store into a cache bound to `model` and `dimension`.
    ///
    /// A missing file yields an empty cache. Corruption, a format version
    /// mismatch, a checksum mismatch or a different model yield an empty
    /// cache and a warning.
    pub fn load(&self, model: &str, dimension: usize) -> Result<EmbeddingCache> {
        let empty = || EmbeddingCache::with_entries(model, dimension, std::iter::empty());

        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(empty()),
            Err(e) => return Err(MdbedError::io(&self.path, e)),
        };

        let file = match self.validate(&data) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(error = %err, "discarding persisted embedding cache");
                return Ok(empty());
            }
        };

        if file.model != model {
            tracing::warn!(
                cached = %file.model,
                current = %model,
                "embedding model changed, discarding persisted cache"
            );
            return Ok(empty());
        }
        if file.dimension != dimension {
            return Err(MdbedError::config(format!(
                "persisted cache {} holds {}-dimensional vectors for model '{model}', provider returns {dimension}",
                self.path.display(),
                file.dimension
            )));
        }

        tracing::debug!(
            path = %self.path.display(),
            entries = file.entries.len(),
            "loaded persisted embedding cache"
        );
        Ok(EmbeddingCache::with_entries(model, dimension, file.entries))
    }

    // Raw bytes, so invalid UTF-8 is reported as corruption like any other
    // parse failure.
    fn validate(&self, data: &[u8]) -> Result<StoreFile> {
        let file: StoreFile = serde_json::from_slice(data)
            .map_err(|e| MdbedError::cache_corruption(&self.path, format!("unreadable: {e}")))?;

        if file.format_version != STORE_FORMAT_VERSION {
            return Err(MdbedError::cache_corruption(
                &self.path,
                format!(
                    "format version {} is not supported (expected {STORE_FORMAT_VERSION})",
                    file.format_version
                ),
            ));
        }
        if let Some((fp, v)) = file.entries.iter().find(|(_, v)| v.len() != file.dimension) {
            return Err(MdbedError::cache_corruption(
                &self.path,
                format!("entry {fp} has {} values, header says {}", v.len(), file.dimension),
            ));
        }
        let expected = checksum(file.entries.iter().map(|(fp, v)| (fp, v.as_slice())));
        if expected != file.checksum {
            return Err(MdbedError::cache_corruption(&self.path, "checksum mismatch"));
        }
        Ok(file)
    }

    /// Write the cache atomically (temporary file, then rename).
    pub fn save(&self, cache: &EmbeddingCache, model: &str, dimension: usize) -> Result<()> {
        let entries: BTreeMap<Fingerprint, Vec<f32>> = cache
            .entries()
            .into_iter()
            .filter(|(_, v)| v.len() == dimension)
            .map(|(fp, v)| (fp, v.to_vec()))
            .collect();
        let file = StoreFile {
            format_version: STORE_FORMAT_VERSION,
            model: model.to_string(),
            dimension,
            checksum: checksum(entries.iter().map(|(fp, v)| (fp, v.as_slice()))),
            entries,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| MdbedError::io(parent, e))?;
            }
        }
        let data = serde_json::to_string(&file)
            .map_err(|e| MdbedError::config(format!("failed to serialize cache: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| MdbedError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| MdbedError::io(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            entries = file.entries.len(),
            "saved embedding cache"
        );
        Ok(())
    }

    /// Read the store header and entry count without building a cache.
    pub fn info(&self) -> Result<Option<StoreInfo>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MdbedError::io(&self.path, e)),
        };
        let file = self.validate(&data)?;
        Ok(Some(StoreInfo {
            path: self.path.clone(),
            model: file.model,
            dimension: file.dimension,
            entries: file.entries.len(),
            size_bytes: data.len() as u64,
        }))
    }

    /// Delete the store. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MdbedError::io(&self.path, e)),
        }
    }
}

/// xxh3 digest over entries in fingerprint order.
fn checksum<'a>(entries: impl Iterator<Item = (&'a Fingerprint, &'a [f32])>) -> String {
    let mut hasher = Xxh3::new();
    for (fp, vector) in entries {
        hasher.update(&fp.as_u128().to_le_bytes());
        for value in vector {
            hasher.update(&value.to_le_bytes());
        }
    }
    format!("{:016x}", hasher.digest())
}
