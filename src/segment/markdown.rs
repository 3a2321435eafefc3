//! Markdown segmenters.
//!
//! Block structure comes from a CommonMark parse, so ATX and setext headings,
//! HTML blocks, lazy continuation lines and fenced code are recognised the
//! way a renderer sees them. Segment content is always whole source lines.

use super::{trim_blank, Segmenter};
use crate::error::SegmentationErrorKind;
use crate::model::{Segment, SegmentKind};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use std::collections::HashMap;
use std::ops::Range;

/// One segment per heading section, plus an optional preamble.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownSectionSegmenter;

/// One segment per leaf block.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownBlockSegmenter;

/// A top-level block found by the parser.
#[derive(Debug)]
enum Block {
    Heading(usize),
    Leaf(SegmentKind),
}

impl Segmenter for MarkdownSectionSegmenter {
    fn segment(&self, source: &str) -> Result<Vec<Segment>, SegmentationErrorKind> {
        let index = LineIndex::new(source);
        let lines: Vec<&str> = source.lines().collect();

        let headings: Vec<(usize, usize)> = top_level_blocks(source, &index, false)?
            .into_iter()
            .filter_map(|(block, range)| match block {
                Block::Heading(level) => Some((index.line_of(range.start), level)),
                Block::Leaf(_) => None,
            })
            .collect();

        let mut segments = Vec::with_capacity(headings.len() + 1);
        let first_heading = headings.first().map_or(lines.len(), |&(i, _)| i);
        if let Some((start, end)) = trim_blank(&lines, 0, first_heading) {
            segments.push(build(&lines, "preamble", SegmentKind::Preamble, start, end));
        }

        let mut outline = Outline::default();
        for (n, &(start, level)) in headings.iter().enumerate() {
            let next = headings.get(n + 1).map_or(lines.len(), |&(i, _)| i);
            let path = outline.enter(level);
            // The heading line itself is never blank
            let (start, end) = trim_blank(&lines, start, next).unwrap_or((start, start + 1));
            segments.push(build(&lines, path, SegmentKind::Section, start, end));
        }

        Ok(segments)
    }

    fn name(&self) -> &'static str {
        "markdown-sections"
    }
}

impl Segmenter for MarkdownBlockSegmenter {
    fn segment(&self, source: &str) -> Result<Vec<Segment>, SegmentationErrorKind> {
        let index = LineIndex::new(source);
        let lines: Vec<&str> = source.lines().collect();
        let mut segments = Vec::new();
        let mut outline = Outline::default();
        let mut section = String::from("preamble");
        let mut counters: HashMap<SegmentKind, usize> = HashMap::new();

        for (block, range) in top_level_blocks(source, &index, true)? {
            let (start, end) = index.line_span(&range);
            let Some((start, end)) = trim_blank(&lines, start, end) else {
                continue;
            };
            match block {
                Block::Heading(level) => {
                    section = outline.enter(level);
                    counters.clear();
                    let path = format!("{section}/heading");
                    segments.push(build(&lines, path, SegmentKind::Heading, start, end));
                }
                Block::Leaf(kind) => {
                    let n = counters.entry(kind).or_insert(0);
                    let path = format!("{section}/{kind}[{n}]");
                    *n += 1;
                    segments.push(build(&lines, path, kind, start, end));
                }
            }
        }

        Ok(segments)
    }

    fn name(&self) -> &'static str {
        "markdown-blocks"
    }
}

/// Blocks that are not nested inside another block, in document order.
///
/// With `split_lists` the items of a top-level list are reported one by one
/// instead of the list as a whole.
fn top_level_blocks(
    source: &str,
    index: &LineIndex,
    split_lists: bool,
) -> Result<Vec<(Block, Range<usize>)>, SegmentationErrorKind> {
    let mut blocks = Vec::new();
    let mut covered = 0;

    for (event, range) in Parser::new_ext(source, Options::empty()).into_offset_iter() {
        let Event::Start(tag) = event else {
            continue;
        };
        if range.start < covered {
            continue;
        }

        let block = match tag {
            Tag::List(_) if split_lists => continue,
            Tag::Heading { level, .. } => Block::Heading(level as usize),
            Tag::CodeBlock(kind) => {
                if matches!(kind, CodeBlockKind::Fenced(_)) {
                    check_fence_closed(source, range.start, index)?;
                }
                Block::Leaf(SegmentKind::CodeBlock)
            }
            Tag::Item => Block::Leaf(SegmentKind::ListItem),
            Tag::BlockQuote(..) => Block::Leaf(SegmentKind::Blockquote),
            Tag::HtmlBlock => Block::Leaf(SegmentKind::Html),
            _ => Block::Leaf(SegmentKind::Paragraph),
        };
        covered = range.end;
        blocks.push((block, range));
    }

    Ok(blocks)
}

/// A fence left open swallows the rest of the document, so it is closed
/// exactly when a matching closing line follows the opening one.
fn check_fence_closed(source: &str, start: usize, index: &LineIndex) -> Result<(), SegmentationErrorKind> {
    let mut lines = source[start..].lines();
    let Some((ch, len, _)) = lines.next().and_then(fence_marker) else {
        return Ok(());
    };
    if lines.any(|line| closes_fence(line, ch, len)) {
        Ok(())
    } else {
        Err(SegmentationErrorKind::UnterminatedFence {
            line: index.line_of(start) + 1,
        })
    }
}

fn build(lines: &[&str], path: impl Into<String>, kind: SegmentKind, start: usize, end: usize) -> Segment {
    Segment::new(path, kind, lines[start..end].join("\n"), start + 1, end)
}

/// Byte offset to zero-based line lookups.
#[derive(Debug)]
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset).saturating_sub(1)
    }

    /// Half-open line range covering a byte range.
    fn line_span(&self, range: &Range<usize>) -> (usize, usize) {
        let start = self.line_of(range.start);
        let end = self.line_of(range.end.saturating_sub(1).max(range.start)) + 1;
        (start, end)
    }
}

/// Heading outline counters (`1`, `1.2`, `1.2.1`).
#[derive(Debug, Default)]
struct Outline {
    counters: [usize; 6],
}

impl Outline {
    fn enter(&mut self, level: usize) -> String {
        let level = level.clamp(1, 6);
        self.counters[level - 1] += 1;
        for c in &mut self.counters[level..] {
            *c = 0;
        }
        self.counters[..level]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Parse a fence marker: returns (char, run length, trailing info string).
fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let ch = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|&c| c == ch).count();
    (len >= 3).then(|| (ch, len, &rest[len..]))
}

fn closes_fence(line: &str, ch: char, len: usize) -> bool {
    matches!(fence_marker(line), Some((c, l, rest)) if c == ch && l >= len && rest.trim().is_empty())
}
