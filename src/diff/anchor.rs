//! Line detail inside a matched segment.
//!
//! A matched segment acts as an anchor: line changes are addressed by their
//! offset from the start of the segment, so they stay meaningful when the
//! segment itself moves.

use super::result::{LineChange, LineChangeKind};
use similar::{ChangeTag, TextDiff};

/// Inserted and deleted lines between two versions of a segment.
pub(crate) fn line_changes(old: &str, new: &str) -> Vec<LineChange> {
    let diff = TextDiff::from_lines(old, new);
    diff.iter_all_changes()
        .filter_map(|change| {
            let kind = match change.tag() {
                ChangeTag::Equal => return None,
                ChangeTag::Delete => LineChangeKind::Delete,
                ChangeTag::Insert => LineChangeKind::Insert,
            };
            Some(LineChange {
                kind,
                old_offset: change.old_index(),
                new_offset: change.new_index(),
                text: change.value().trim_end_matches(|c: char| c == '\n' || c == '\r').to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_replaced() {
        let changes = line_changes("# Title\nold body\nfooter\n", "# Title\nnew body\nfooter\n");
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind, LineChangeKind::Delete);
        assert_eq!(changes[0].old_offset, Some(1));
        assert_eq!(changes[0].new_offset, None);
        assert_eq!(changes[0].text, "old body");
        assert_eq!(changes[1].kind, LineChangeKind::Insert);
        assert_eq!(changes[1].new_offset, Some(1));
        assert_eq!(changes[1].text, "new body");
    }

    #[test]
    fn test_identical_content_has_no_changes() {
        assert!(line_changes("a\nb", "a\nb").is_empty());
    }

    #[test]
    fn test_appended_line() {
        let changes = line_changes("a\n", "a\nb\n");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, LineChangeKind::Insert);
        assert_eq!(changes[0].new_offset, Some(1));
    }
}
