//! Semantic diff of segmented documents.
//!
//! [`DiffEngine::compare`] fingerprints both documents, runs the
//! [`SimilarityMatcher`](crate::matching::SimilarityMatcher) and classifies
//! every segment:
//!
//! | matched by  | same position | different position |
//! |-------------|---------------|--------------------|
//! | fingerprint | `unchanged`   | `moved`            |
//! | similarity  | `modified`    | `moved+modified`   |
//!
//! Unmatched old segments are `removed`, unmatched new segments `added`.
//!
//! [`DiffEngine::find_similar`] runs the similarity pass over a single
//! document instead and lists its near-duplicate segment pairs.
//!
//! # Example
//!
//! ```
//! use mdbed::diff::{DiffEngine, DiffKind};
//! use mdbed::embedding::{CancellationToken, EmbeddingCache, HashEmbedder};
//! use mdbed::model::{Document, Version};
//!
//! let old = Document::from_texts(Version::Old, &["def foo(): return 1", "def bar(): return 2"]);
//! let new = Document::from_texts(Version::New, &["def bar(): return 2", "def foo(): return 1"]);
//!
//! let report = DiffEngine::new()
//!     .compare(&old, &new, &HashEmbedder::default(), &EmbeddingCache::new(), &CancellationToken::new())
//!     .unwrap();
//! assert_eq!(report.summary.moved, 2);
//! assert!(report.entries.iter().all(|e| e.kind == DiffKind::Moved));
//! ```

mod anchor;
mod classify;
mod engine;
mod result;
mod similar;

pub use engine::DiffEngine;
pub use result::{
    DiffEntry, DiffKind, DiffReport, DiffSummary, LineChange, LineChangeKind, ReportWarning,
};
pub use self::similar::{SimilarPair, SimilarReport};
