//! Source code segmentation using tree-sitter.
//!
//! Each top-level definition becomes one segment labelled by its kind and
//! name (`def foo`, `class Bar`, `impl Display for Point`). Comments and
//! attributes directly above a definition belong to it. Consecutive
//! top-level nodes that are not definitions form a `module[n]` segment.

use super::Segmenter;
use crate::error::SegmentationErrorKind;
use crate::model::{Segment, SegmentKind};
use tree_sitter::{Language, Node, Parser};

const SNIPPET_WIDTH: usize = 60;

/// Languages with a tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLanguage {
    Python,
    Rust,
}

impl CodeLanguage {
    fn grammar(self) -> Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Nodes that attach to the definition directly below them.
    fn is_prefix(self, kind: &str) -> bool {
        match self {
            Self::Python => kind == "comment",
            Self::Rust => matches!(kind, "attribute_item" | "line_comment" | "block_comment"),
        }
    }

    /// Label for a top-level definition, `None` for anything else.
    fn definition_label(self, node: &Node<'_>, source: &str) -> Option<String> {
        let name = |field: &str| node.child_by_field_name(field).map(|n| node_text(&n, source));
        match (self, node.kind()) {
            (Self::Python, "function_definition") => Some(format!("def {}", name("name")?)),
            (Self::Python, "class_definition") => Some(format!("class {}", name("name")?)),
            (Self::Python, "decorated_definition") => {
                let inner = node.child_by_field_name("definition")?;
                self.definition_label(&inner, source)
            }
            (Self::Rust, "function_item") => Some(format!("fn {}", name("name")?)),
            (Self::Rust, "struct_item") => Some(format!("struct {}", name("name")?)),
            (Self::Rust, "enum_item") => Some(format!("enum {}", name("name")?)),
            (Self::Rust, "union_item") => Some(format!("union {}", name("name")?)),
            (Self::Rust, "trait_item") => Some(format!("trait {}", name("name")?)),
            (Self::Rust, "mod_item") => Some(format!("mod {}", name("name")?)),
            (Self::Rust, "const_item") => Some(format!("const {}", name("name")?)),
            (Self::Rust, "static_item") => Some(format!("static {}", name("name")?)),
            (Self::Rust, "type_item") => Some(format!("type {}", name("name")?)),
            (Self::Rust, "macro_definition") => Some(format!("macro {}!", name("name")?)),
            (Self::Rust, "use_declaration") => Some(format!("use {}", name("argument")?)),
            (Self::Rust, "impl_item") => {
                let ty = name("type")?;
                Some(match name("trait") {
                    Some(tr) => format!("impl {tr} for {ty}"),
                    None => format!("impl {ty}"),
                })
            }
            _ => None,
        }
    }
}

/// Segments top-level definitions of a source file.
#[derive(Debug, Clone, Copy)]
pub struct CodeSegmenter {
    language: CodeLanguage,
}

impl CodeSegmenter {
    #[must_use]
    pub const fn new(language: CodeLanguage) -> Self {
        Self { language }
    }
}

impl Segmenter for CodeSegmenter {
    fn segment(&self, source: &str) -> Result<Vec<Segment>, SegmentationErrorKind> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language.grammar())
            .map_err(|e| SegmentationErrorKind::Parser(e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SegmentationErrorKind::Parser("parser produced no tree".into()))?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(syntax_error(first_error(root), source));
        }

        let mut segments = Vec::new();
        let mut modules = 0usize;
        let mut run: Vec<Node<'_>> = Vec::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            let Some(label) = self.language.definition_label(&child, source) else {
                run.push(child);
                continue;
            };

            // Detach the comments and attributes sitting directly above
            let mut first = child;
            let mut split = run.len();
            while split > 0 {
                let prev = run[split - 1];
                if self.language.is_prefix(prev.kind())
                    && prev.end_position().row + 1 >= first.start_position().row
                {
                    first = prev;
                    split -= 1;
                } else {
                    break;
                }
            }
            run.truncate(split);
            flush_module(&mut run, &mut modules, &mut segments, source);
            segments.push(span_segment(label, SegmentKind::Definition, &first, &child, source));
        }
        flush_module(&mut run, &mut modules, &mut segments, source);

        Ok(segments)
    }

    fn name(&self) -> &'static str {
        match self.language {
            CodeLanguage::Python => "python",
            CodeLanguage::Rust => "rust",
        }
    }
}

fn flush_module(run: &mut Vec<Node<'_>>, modules: &mut usize, segments: &mut Vec<Segment>, source: &str) {
    if let (Some(first), Some(last)) = (run.first(), run.last()) {
        segments.push(span_segment(
            format!("module[{modules}]"),
            SegmentKind::Module,
            first,
            last,
            source,
        ));
        *modules += 1;
    }
    run.clear();
}

fn span_segment(path: String, kind: SegmentKind, first: &Node<'_>, last: &Node<'_>, source: &str) -> Segment {
    let text = source
        .get(first.start_byte()..last.end_byte())
        .unwrap_or_default()
        .trim_end_matches(['\n', '\r']);
    let start_line = first.start_position().row + 1;
    let end = last.end_position();
    // Nodes that swallow their trailing newline end at column 0 of the next row
    let end_line = if end.column == 0 && end.row + 1 > start_line {
        end.row
    } else {
        end.row + 1
    };
    Segment::new(path, kind, text, start_line, end_line)
}

fn node_text<'a>(node: &Node<'_>, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or_default()
}

/// Depth-first search for the first error or missing node.
fn first_error(node: Node<'_>) -> Node<'_> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() || child.is_missing() {
            return child;
        }
        if child.has_error() {
            return first_error(child);
        }
    }
    node
}

fn syntax_error(node: Node<'_>, source: &str) -> SegmentationErrorKind {
    let pos = node.start_position();
    let snippet: String = source
        .lines()
        .nth(pos.row)
        .unwrap_or_default()
        .trim()
        .chars()
        .take(SNIPPET_WIDTH)
        .collect();
    SegmentationErrorKind::Syntax {
        line: pos.row + 1,
        column: pos.column + 1,
        snippet,
    }
}
