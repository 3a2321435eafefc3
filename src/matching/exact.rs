//! Exact fingerprint pass.

use super::{Correspondence, MatchKind, SegmentKey};
use crate::addressing::Fingerprint;
use std::collections::{HashMap, VecDeque};

/// Result of the exact pass.
#[derive(Debug, Default)]
pub(crate) struct ExactPass {
    pub pairs: Vec<Correspondence>,
    /// Old indices left unmatched, ascending
    pub residual_old: Vec<usize>,
    /// New indices left unmatched, ascending
    pub residual_new: Vec<usize>,
}

/// Pair segments with equal fingerprints.
///
/// For a fingerprint occurring several times, the i-th old occurrence pairs
/// with the i-th new occurrence in document order; surplus occurrences on
/// either side fall through.
pub(crate) fn exact_pass(old: &[SegmentKey<'_>], new: &[SegmentKey<'_>]) -> ExactPass {
    let mut by_fingerprint: HashMap<Fingerprint, VecDeque<usize>> = HashMap::new();
    for key in new {
        by_fingerprint
            .entry(key.fingerprint)
            .or_default()
            .push_back(key.index);
    }

    let mut pass = ExactPass::default();
    let mut matched_new = vec![false; new.len()];
    for key in old {
        match by_fingerprint
            .get_mut(&key.fingerprint)
            .and_then(VecDeque::pop_front)
        {
            Some(new_index) => {
                matched_new[new_index] = true;
                pass.pairs.push(Correspondence {
                    old_index: key.index,
                    new_index,
                    kind: MatchKind::Exact,
                    similarity: 1.0,
                });
            }
            None => pass.residual_old.push(key.index),
        }
    }

    pass.residual_new = new
        .iter()
        .filter(|k| !matched_new[k.index])
        .map(|k| k.index)
        .collect();
    pass
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[u128]) -> Vec<SegmentKey<'static>> {
        raw.iter()
            .enumerate()
            .map(|(index, v)| SegmentKey {
                index,
                fingerprint: Fingerprint::from_raw(*v),
                content: "",
            })
            .collect()
    }

    fn pairs(pass: &ExactPass) -> Vec<(usize, usize)> {
        pass.pairs.iter().map(|c| (c.old_index, c.new_index)).collect()
    }

    #[test]
    fn test_swap() {
        let pass = exact_pass(&keys(&[1, 2]), &keys(&[2, 1]));
        assert_eq!(pairs(&pass), vec![(0, 1), (1, 0)]);
        assert!(pass.residual_old.is_empty());
        assert!(pass.residual_new.is_empty());
    }

    #[test]
    fn test_duplicates_pair_in_order_with_surplus() {
        // Fingerprint 7 appears three times in old, twice in new
        let pass = exact_pass(&keys(&[7, 3, 7, 7]), &keys(&[7, 9, 7]));
        assert_eq!(pairs(&pass), vec![(0, 0), (2, 2)]);
        assert_eq!(pass.residual_old, vec![1, 3]);
        assert_eq!(pass.residual_new, vec![1]);
    }

    #[test]
    fn test_empty_sides() {
        let pass = exact_pass(&[], &keys(&[1, 2]));
        assert!(pass.pairs.is_empty());
        assert_eq!(pass.residual_new, vec![0, 1]);

        let pass = exact_pass(&keys(&[5]), &[]);
        assert_eq!(pass.residual_old, vec![0]);
    }
}
