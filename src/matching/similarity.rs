//! Cosine similarity and thresholded candidate generation.

use super::Candidate;
use crate::embedding::Embedding;
use rayon::prelude::*;

/// Rows above which the similarity matrix is computed in parallel.
const PARALLEL_THRESHOLD: usize = 50;

/// Cosine similarity clamped to [0, 1].
///
/// Zero vectors have similarity 0 with everything. Accumulates in f64 so the
/// score does not depend on argument order.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// All (old, new) pairs whose similarity is at least `threshold`.
///
/// Pairs with a NaN score are never candidates. The result order is
/// row-major regardless of whether rows ran in parallel.
pub(crate) fn candidate_pairs(
    old: &[(usize, Embedding)],
    new: &[(usize, Embedding)],
    threshold: f64,
) -> Vec<Candidate> {
    let row = |(old_index, a): &(usize, Embedding)| -> Vec<Candidate> {
        new.iter()
            .filter_map(|(new_index, b)| {
                let similarity = cosine_similarity(a, b);
                (similarity >= threshold).then_some(Candidate {
                    old_index: *old_index,
                    new_index: *new_index,
                    similarity,
                })
            })
            .collect()
    };

    if old.len() > PARALLEL_THRESHOLD {
        old.par_iter().flat_map_iter(row).collect()
    } else {
        old.iter().flat_map(row).collect()
    }
}

/// Unordered pairs within one set whose similarity is at least `threshold`.
///
/// Each pair is reported once, with the earlier entry of `items` as
/// `old_index`. Self-pairs are never produced.
pub(crate) fn pairs_within(items: &[(usize, Embedding)], threshold: f64) -> Vec<Candidate> {
    let row = |(offset, (source, a)): (usize, &(usize, Embedding))| -> Vec<Candidate> {
        items[offset + 1..]
            .iter()
            .filter_map(|(target, b)| {
                let similarity = cosine_similarity(a, b);
                (similarity >= threshold).then_some(Candidate {
                    old_index: *source,
                    new_index: *target,
                    similarity,
                })
            })
            .collect()
    };

    if items.len() > PARALLEL_THRESHOLD {
        items.par_iter().enumerate().flat_map_iter(row).collect()
    } else {
        items.iter().enumerate().flat_map(row).collect()
    }
}
