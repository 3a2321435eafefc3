//! Plain text segmentation by blank-line separated paragraphs.

use super::Segmenter;
use crate::error::SegmentationErrorKind;
use crate::model::{Segment, SegmentKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphSegmenter;

impl Segmenter for ParagraphSegmenter {
    fn segment(&self, source: &str) -> Result<Vec<Segment>, SegmentationErrorKind> {
        let lines: Vec<&str> = source.lines().collect();
        let mut segments = Vec::new();
        let mut start: Option<usize> = None;

        for i in 0..=lines.len() {
            let blank = lines.get(i).map_or(true, |l| l.trim().is_empty());
            match (start, blank) {
                (None, false) => start = Some(i),
                (Some(s), true) => {
                    let n = segments.len();
                    segments.push(Segment::new(
                        format!("p[{n}]"),
                        SegmentKind::Paragraph,
                        lines[s..i].join("\n"),
                        s + 1,
                        i,
                    ));
                    start = None;
                }
                _ => {}
            }
        }

        Ok(segments)
    }

    fn name(&self) -> &'static str {
        "paragraphs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs() {
        let source = "\nfirst line\nstill first\n\n\nsecond\n   \nthird";
        let segments = ParagraphSegmenter.segment(source).unwrap();
        let paths: Vec<_> = segments.iter().map(Segment::path).collect();
        assert_eq!(paths, vec!["p[0]", "p[1]", "p[2]"]);
        assert_eq!(segments[0].content, "first line\nstill first");
        assert_eq!((segments[0].start_line, segments[0].end_line), (2, 3));
        assert_eq!(segments[2].content, "third");
    }

    #[test]
    fn test_blank_input() {
        assert!(ParagraphSegmenter.segment("  \n\n").unwrap().is_empty());
    }
}
