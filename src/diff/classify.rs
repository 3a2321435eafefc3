//! Turn a match outcome into ordered report entries.

use super::result::{DiffEntry, DiffKind, ReportWarning};
use crate::matching::{Correspondence, MatchKind, MatchOutcome};
use crate::model::{Document, Version};

/// Sort key: (new position anchor, tier, old position).
///
/// Matched and added entries sit at their new position with tier 1. A removed
/// segment follows the new position of the nearest preceding matched old
/// segment (tier 2), or goes to the top (tier 0) when no such segment exists.
type OrderKey = (usize, u8, usize);

/// Classify one matched pair.
pub(crate) fn classify_pair(pair: &Correspondence) -> DiffKind {
    let same_position = pair.old_index == pair.new_index;
    match (pair.kind, same_position) {
        (MatchKind::Exact, true) => DiffKind::Unchanged,
        (MatchKind::Exact, false) => DiffKind::Moved,
        (MatchKind::Similarity, true) => DiffKind::Modified,
        (MatchKind::Similarity, false) => DiffKind::MovedModified,
    }
}

/// Build report entries in report order.
pub(crate) fn build_entries(
    outcome: &MatchOutcome,
    old: &Document,
    new: &Document,
) -> Vec<DiffEntry> {
    let mut old_to_new: Vec<Option<usize>> = vec![None; old.len()];
    for pair in &outcome.pairs {
        old_to_new[pair.old_index] = Some(pair.new_index);
    }

    let mut keyed: Vec<(OrderKey, DiffEntry)> =
        Vec::with_capacity(outcome.pairs.len() + outcome.unmatched_old.len() + outcome.unmatched_new.len());

    for pair in &outcome.pairs {
        let old_segment = &old.segments()[pair.old_index];
        let new_segment = &new.segments()[pair.new_index];
        keyed.push((
            (pair.new_index, 1, 0),
            DiffEntry {
                kind: classify_pair(pair),
                old_position: Some(pair.old_index),
                new_position: Some(pair.new_index),
                similarity: Some(pair.similarity),
                old_path: Some(old_segment.path().to_string()),
                new_path: Some(new_segment.path().to_string()),
                line_changes: Vec::new(),
            },
        ));
    }

    for &index in &outcome.unmatched_new {
        keyed.push((
            (index, 1, 0),
            DiffEntry::added(index, new.segments()[index].path()),
        ));
    }

    // Walk old positions once, remembering the last matched anchor
    let mut removed = outcome.unmatched_old.iter().copied().peekable();
    let mut anchor: Option<usize> = None;
    for (old_index, mapped) in old_to_new.iter().enumerate() {
        if removed.peek() == Some(&old_index) {
            removed.next();
            let key = match anchor {
                Some(new_index) => (new_index, 2, old_index),
                None => (0, 0, old_index),
            };
            keyed.push((key, DiffEntry::removed(old_index, old.segments()[old_index].path())));
        }
        if mapped.is_some() {
            anchor = *mapped;
        }
    }

    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, entry)| entry).collect()
}

/// Warnings for segments that sat out the similarity pass.
pub(crate) fn build_warnings(
    outcome: &MatchOutcome,
    old: &Document,
    new: &Document,
) -> Vec<ReportWarning> {
    let mut warnings: Vec<ReportWarning> = outcome
        .unavailable
        .iter()
        .map(|u| {
            let document = match u.version {
                Version::Old => old,
                Version::New => new,
            };
            ReportWarning {
                version: u.version,
                position: u.index,
                path: document.segments()[u.index].path().to_string(),
                fingerprint: u.fingerprint,
                message: format!("embedding unavailable: {}", u.reason),
            }
        })
        .collect();
    warnings.sort_by_key(|w| (w.version == Version::New, w.position));
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(old_index: usize, new_index: usize, kind: MatchKind) -> Correspondence {
        Correspondence {
            old_index,
            new_index,
            kind,
            similarity: if kind == MatchKind::Exact { 1.0 } else { 0.8 },
        }
    }

    fn docs(old: usize, new: usize) -> (Document, Document) {
        let old_texts: Vec<String> = (0..old).map(|i| format!("old {i}")).collect();
        let new_texts: Vec<String> = (0..new).map(|i| format!("new {i}")).collect();
        (
            Document::from_texts(Version::Old, &old_texts),
            Document::from_texts(Version::New, &new_texts),
        )
    }

    fn shape(entries: &[DiffEntry]) -> Vec<(DiffKind, Option<usize>, Option<usize>)> {
        entries
            .iter()
            .map(|e| (e.kind, e.old_position, e.new_position))
            .collect()
    }

    #[test]
    fn test_classify_pair() {
        assert_eq!(classify_pair(&pair(1, 1, MatchKind::Exact)), DiffKind::Unchanged);
        assert_eq!(classify_pair(&pair(1, 2, MatchKind::Exact)), DiffKind::Moved);
        assert_eq!(classify_pair(&pair(0, 0, MatchKind::Similarity)), DiffKind::Modified);
        assert_eq!(
            classify_pair(&pair(0, 3, MatchKind::Similarity)),
            DiffKind::MovedModified
        );
    }

    #[test]
    fn test_removed_follows_preceding_anchor() {
        // old: [A, X, B]  new: [A, B, C]
        let (old, new) = docs(3, 3);
        let outcome = MatchOutcome {
            pairs: vec![pair(0, 0, MatchKind::Exact), pair(2, 1, MatchKind::Exact)],
            unmatched_old: vec![1],
            unmatched_new: vec![2],
            unavailable: Vec::new(),
        };
        let entries = build_entries(&outcome, &old, &new);
        assert_eq!(
            shape(&entries),
            vec![
                (DiffKind::Unchanged, Some(0), Some(0)),
                (DiffKind::Removed, Some(1), None),
                (DiffKind::Moved, Some(2), Some(1)),
                (DiffKind::Added, None, Some(2)),
            ]
        );
    }

    #[test]
    fn test_leading_removals_go_first() {
        // old: [X, Y, A]  new: [A]
        let (old, new) = docs(3, 1);
        let outcome = MatchOutcome {
            pairs: vec![pair(2, 0, MatchKind::Exact)],
            unmatched_old: vec![0, 1],
            unmatched_new: Vec::new(),
            unavailable: Vec::new(),
        };
        let entries = build_entries(&outcome, &old, &new);
        assert_eq!(
            shape(&entries),
            vec![
                (DiffKind::Removed, Some(0), None),
                (DiffKind::Removed, Some(1), None),
                (DiffKind::Moved, Some(2), Some(0)),
            ]
        );
    }

    #[test]
    fn test_only_removals() {
        let (old, new) = docs(2, 0);
        let outcome = MatchOutcome {
            pairs: Vec::new(),
            unmatched_old: vec![0, 1],
            unmatched_new: Vec::new(),
            unavailable: Vec::new(),
        };
        let entries = build_entries(&outcome, &old, &new);
        assert_eq!(
            shape(&entries),
            vec![(DiffKind::Removed, Some(0), None), (DiffKind::Removed, Some(1), None)]
        );
        assert_eq!(entries[0].old_path.as_deref(), Some("s[0]"));
    }
}
