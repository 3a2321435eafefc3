//! Unified error types for mdbed.
//!
//! Errors fall into two groups. Fatal errors (segmentation, configuration,
//! IO, cancellation) abort a comparison before or while it runs. Recoverable
//! conditions (an unavailable embedding, a corrupt persisted cache) are
//! modelled here as well so they can be logged and reported, but the diff
//! engine degrades around them instead of returning them.

use crate::addressing::Fingerprint;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mdbed operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MdbedError {
    /// The input document could not be segmented
    #[error("Failed to segment document: {context}")]
    Segmentation {
        context: String,
        #[source]
        source: SegmentationErrorKind,
    },

    /// No embedding could be obtained for a segment
    #[error("Embedding unavailable for {fingerprint}: {source}")]
    EmbeddingUnavailable {
        fingerprint: Fingerprint,
        #[source]
        source: ProviderError,
    },

    /// Invalid configuration, detected before any matching work
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The persisted embedding cache failed validation
    #[error("Embedding cache at {path:?} is unusable: {reason}")]
    CacheCorruption { path: PathBuf, reason: String },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The comparison was cancelled at an embedding fetch point
    #[error("Comparison cancelled")]
    Cancelled,
}

/// Specific segmentation error kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SegmentationErrorKind {
    #[error("Unterminated code fence opened at line {line}")]
    UnterminatedFence { line: usize },

    #[error("Syntax error at line {line}, column {column}: {snippet}")]
    Syntax {
        line: usize,
        column: usize,
        snippet: String,
    },

    #[error("Parser setup failed: {0}")]
    Parser(String),
}

/// Errors reported by an embedding provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("provider request failed: {0}")]
    Failed(String),

    #[error("provider returned {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("provider returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("no embedding is cached and this provider does not compute")]
    NotCached,
}

/// Convenient Result type for mdbed operations
pub type Result<T> = std::result::Result<T, MdbedError>;

impl MdbedError {
    /// Create a segmentation error with context
    pub fn segmentation(context: impl Into<String>, source: SegmentationErrorKind) -> Self {
        Self::Segmentation {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a cache corruption error
    pub fn cache_corruption(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CacheCorruption {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Whether the error invalidates the whole comparison.
    ///
    /// Unavailable embeddings and cache corruption are recovered locally;
    /// everything else aborts.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::EmbeddingUnavailable { .. } | Self::CacheCorruption { .. }
        )
    }
}

impl From<std::io::Error> for MdbedError {
    fn from(err: std::io::Error) -> Self {
        let message = format!("{err}");
        Self::Io {
            path: None,
            message,
            source: err,
        }
    }
}
