//! Cache command handlers.

use crate::config::AppConfig;
use crate::embedding::CacheStore;
use anyhow::{Context, Result};

fn configured_store(config: &AppConfig) -> Result<CacheStore> {
    config
        .cache
        .resolved_path()
        .map(CacheStore::new)
        .context("No cache path configured and no platform cache directory available")
}

/// Print information about the persisted embedding store.
pub fn run_cache_stats(config: &AppConfig) -> Result<()> {
    let store = configured_store(config)?;
    match store.info()? {
        Some(info) => {
            println!("Cache:     {}", info.path.display());
            println!("Model:     {}", info.model);
            println!("Dimension: {}", info.dimension);
            println!("Entries:   {}", info.entries);
            println!("Size:      {} bytes", info.size_bytes);
        }
        None => println!("No embedding cache at {}", store.path().display()),
    }
    Ok(())
}

/// Delete the persisted embedding store. Returns whether anything was removed.
pub fn run_cache_clear(config: &AppConfig) -> Result<bool> {
    let store = configured_store(config)?;
    let removed = store.clear()?;
    if !config.behavior.quiet {
        if removed {
            tracing::info!("Removed embedding cache {}", store.path().display());
        } else {
            tracing::info!("No embedding cache at {}", store.path().display());
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingCache;

    #[test]
    fn test_clear_removes_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        CacheStore::new(&path)
            .save(&EmbeddingCache::new(), "hash-v1", 384)
            .unwrap();

        let config = AppConfig::builder().cache_path(Some(path.clone())).quiet(true).build();
        run_cache_stats(&config).unwrap();
        assert!(run_cache_clear(&config).unwrap());
        assert!(!path.exists());
        assert!(!run_cache_clear(&config).unwrap());
    }
}
