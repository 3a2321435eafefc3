//! Summary and table report generators for shell output.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, SegmentListing};
use crate::diff::{DiffEntry, DiffKind, DiffReport, LineChangeKind, SimilarReport};
use std::collections::BTreeMap;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "blue" => format!("\x1b[34m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

const fn kind_color(kind: DiffKind) -> &'static str {
    match kind {
        DiffKind::Unchanged => "dim",
        DiffKind::Moved => "blue",
        DiffKind::Modified | DiffKind::MovedModified => "yellow",
        DiffKind::Added => "green",
        DiffKind::Removed => "red",
    }
}

const fn kind_marker(kind: DiffKind) -> &'static str {
    match kind {
        DiffKind::Unchanged => "=",
        DiffKind::Moved => ">",
        DiffKind::Modified => "~",
        DiffKind::MovedModified => "~>",
        DiffKind::Added => "+",
        DiffKind::Removed => "-",
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "segment"
    } else {
        "segments"
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate_diff_report(
        &self,
        report: &DiffReport,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        lines.push(self.color("Document Diff Summary", "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));

        let old_name = config.metadata.old_path.as_deref().unwrap_or("old");
        let new_name = config.metadata.new_path.as_deref().unwrap_or("new");
        lines.push(format!(
            "{}  {} → {}",
            self.color("Files:", "cyan"),
            old_name,
            new_name
        ));

        let old_count = report.entries.iter().filter(|e| e.old_position.is_some()).count();
        let new_count = report.entries.iter().filter(|e| e.new_position.is_some()).count();
        lines.push(format!(
            "{}  {} → {} segments",
            self.color("Size:", "cyan"),
            old_count,
            new_count
        ));
        lines.push(String::new());

        lines.push(self.color("Changes:", "bold"));
        let s = &report.summary;
        let rows = [
            (s.added, DiffKind::Added, "added"),
            (s.removed, DiffKind::Removed, "removed"),
            (s.modified, DiffKind::Modified, "modified"),
            (s.moved, DiffKind::Moved, "moved"),
            (s.moved_modified, DiffKind::MovedModified, "moved and modified"),
        ];
        for (count, kind, label) in rows {
            if count > 0 {
                lines.push(format!(
                    "  {} {} {label}",
                    self.color(&format!("{}{count}", kind_marker(kind)), kind_color(kind)),
                    plural(count)
                ));
            }
        }
        if !report.has_changes() {
            lines.push(format!("  {}", self.color("No changes", "dim")));
        }
        if config.include_unchanged || !report.has_changes() {
            lines.push(format!(
                "  {} unchanged",
                self.color(&s.unchanged.to_string(), "dim")
            ));
        }

        if !report.warnings.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "{}  {} {} without embedding (matches may be missed)",
                self.color("Warnings:", "yellow"),
                report.warnings.len(),
                plural(report.warnings.len())
            ));
        }

        if let Some(threshold) = config.metadata.threshold {
            lines.push(String::new());
            lines.push(format!(
                "{}  {threshold:.2}",
                self.color("Threshold:", "cyan")
            ));
        }

        Ok(lines.join("\n"))
    }

    fn generate_segments_report(&self, listing: &SegmentListing) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        lines.push(self.color("Segments", "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));
        if let Some(name) = &listing.name {
            lines.push(format!("{}  {}", self.color("Name:", "cyan"), name));
        }
        lines.push(format!("{}  {}", self.color("Policy:", "cyan"), listing.policy));
        lines.push(format!(
            "{}  {}",
            self.color("Segments:", "cyan"),
            listing.segments.len()
        ));

        let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for row in &listing.segments {
            *by_kind.entry(row.kind.to_string()).or_default() += 1;
        }
        for (kind, count) in by_kind {
            lines.push(format!("  {count:>5}  {kind}"));
        }
        Ok(lines.join("\n"))
    }

    fn generate_similar_report(
        &self,
        report: &SimilarReport,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        lines.push(self.color("Similar Segments", "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));
        if !config.metadata.inputs.is_empty() {
            lines.push(format!(
                "{}  {}",
                self.color("Inputs:", "cyan"),
                config.metadata.inputs.join(", ")
            ));
        }
        lines.push(format!(
            "{}  {} searched",
            self.color("Size:", "cyan"),
            report.segments
        ));
        if let Some(threshold) = config.metadata.threshold {
            lines.push(format!("{}  {threshold:.2}", self.color("Threshold:", "cyan")));
        }
        lines.push(String::new());

        if report.pairs.is_empty() {
            lines.push(format!("  {}", self.color("No similar pairs", "dim")));
        } else {
            let exact = report.pairs.iter().filter(|p| p.similarity >= 1.0).count();
            lines.push(format!(
                "  {} similar {}, {} identical",
                self.color(&report.pairs.len().to_string(), "yellow"),
                if report.pairs.len() == 1 { "pair" } else { "pairs" },
                exact
            ));
            if let Some(top) = report.pairs.first() {
                lines.push(format!(
                    "  closest: {} ~ {} ({:.2})",
                    top.source_path, top.target_path, top.similarity
                ));
            }
        }

        if !report.warnings.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "{}  {} {} without embedding (pairs may be missed)",
                self.color("Warnings:", "yellow"),
                report.warnings.len(),
                plural(report.warnings.len())
            ));
        }
        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}

/// Table reporter for terminal output with aligned columns
pub struct TableReporter {
    /// Use colored output
    colored: bool,
}

impl TableReporter {
    /// Create a new table reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    /// Colorize after padding so escape codes do not disturb alignment.
    fn cell(&self, text: &str, width: usize, color: &str) -> String {
        self.color(&pad(text, width), color)
    }

    fn entry_row(&self, entry: &DiffEntry) -> String {
        let position = |p: Option<usize>| p.map_or_else(|| "-".to_string(), |i| i.to_string());
        let similarity = entry
            .similarity
            .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
        format!(
            "{} {} {} {} {}",
            self.cell(entry.kind.as_str(), 15, kind_color(entry.kind)),
            pad(&position(entry.old_position), 5),
            pad(&position(entry.new_position), 5),
            pad(&similarity, 5),
            truncate(entry.label(), 50)
        )
    }
}

impl Default for TableReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TableReporter {
    fn generate_diff_report(
        &self,
        report: &DiffReport,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} {} {} {} {}",
            self.cell("STATUS", 15, "bold"),
            self.cell("OLD", 5, "bold"),
            self.cell("NEW", 5, "bold"),
            self.cell("SIM", 5, "bold"),
            self.color("SEGMENT", "bold")
        ));
        lines.push("─".repeat(85));

        for entry in &report.entries {
            if entry.kind == DiffKind::Unchanged && !config.include_unchanged {
                continue;
            }
            lines.push(self.entry_row(entry));
            for change in &entry.line_changes {
                let (marker, color, offset) = match change.kind {
                    LineChangeKind::Delete => ("-", "red", change.old_offset),
                    LineChangeKind::Insert => ("+", "green", change.new_offset),
                };
                lines.push(format!(
                    "{:>18} {}",
                    offset.map_or_else(String::new, |o| format!("@{o}")),
                    self.color(&format!("{marker} {}", truncate(&change.text, 60)), color)
                ));
            }
        }

        if !report.warnings.is_empty() {
            lines.push(String::new());
            for warning in &report.warnings {
                lines.push(format!(
                    "{} {} segment {} ({}): {}",
                    self.color("warning:", "yellow"),
                    warning.version,
                    warning.position,
                    truncate(&warning.path, 30),
                    warning.message
                ));
            }
        }

        let s = &report.summary;
        lines.push(String::new());
        lines.push(format!(
            "Total: {} added, {} removed, {} modified, {} moved, {} moved+modified | {} unchanged",
            s.added, s.removed, s.modified, s.moved, s.moved_modified, s.unchanged
        ));

        Ok(lines.join("\n"))
    }

    fn generate_segments_report(&self, listing: &SegmentListing) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        lines.push(format!(
            "{} {} {} {} {}",
            self.cell("#", 5, "bold"),
            self.cell("KIND", 12, "bold"),
            self.cell("LINES", 11, "bold"),
            self.cell("FINGERPRINT", 12, "bold"),
            self.color("PATH", "bold")
        ));
        lines.push("─".repeat(85));
        for row in &listing.segments {
            lines.push(format!(
                "{} {} {} {} {}",
                pad(&row.index.to_string(), 5),
                self.cell(&row.kind.to_string(), 12, "cyan"),
                pad(&format!("{}-{}", row.start_line, row.end_line), 11),
                self.cell(&row.fingerprint.short(), 12, "dim"),
                truncate(&row.path, 40)
            ));
        }
        Ok(lines.join("\n"))
    }

    fn generate_similar_report(
        &self,
        report: &SimilarReport,
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        lines.push(format!(
            "{} {}   {}",
            self.cell("SIM", 5, "bold"),
            self.cell("SOURCE", 38, "bold"),
            self.color("TARGET", "bold")
        ));
        lines.push("─".repeat(85));
        for pair in &report.pairs {
            let color = if pair.similarity >= 1.0 { "blue" } else { "yellow" };
            lines.push(format!(
                "{} {} ~ {}",
                self.cell(&format!("{:.2}", pair.similarity), 5, color),
                pad(&format!("#{} {}", pair.source, pair.source_path), 38),
                truncate(&format!("#{} {}", pair.target, pair.target_path), 38)
            ));
        }

        if !report.warnings.is_empty() {
            lines.push(String::new());
            for warning in &report.warnings {
                lines.push(format!(
                    "{} segment {} ({}): {}",
                    self.color("warning:", "yellow"),
                    warning.position,
                    truncate(&warning.path, 30),
                    warning.message
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "Total: {} pairs among {} segments",
            report.pairs.len(),
            report.segments
        ));
        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Table
    }
}

/// Pad to a display width, truncating first if needed.
fn pad(s: &str, width: usize) -> String {
    let text = truncate(s, width);
    let fill = width.saturating_sub(UnicodeWidthStr::width(text.as_str()));
    format!("{text}{}", " ".repeat(fill))
}

/// Truncate a string with ellipsis, using Unicode display width.
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let budget = if max_width > 3 { max_width - 3 } else { max_width };
    let mut width = 0;
    let truncated: String = s
        .chars()
        .take_while(|ch| {
            let w = UnicodeWidthChar::width(*ch).unwrap_or(0);
            if width + w > budget {
                return false;
            }
            width += w;
            true
        })
        .collect();
    if max_width > 3 {
        format!("{truncated}...")
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{DiffEntry, LineChange, SimilarPair};

    fn entry(kind: DiffKind, old: Option<usize>, new: Option<usize>) -> DiffEntry {
        DiffEntry {
            kind,
            old_position: old,
            new_position: new,
            similarity: old.and(new).map(|_| 0.9),
            old_path: old.map(|i| format!("s[{i}]")),
            new_path: new.map(|i| format!("s[{i}]")),
            line_changes: Vec::new(),
        }
    }

    fn sample() -> DiffReport {
        let mut modified = entry(DiffKind::Modified, Some(1), Some(1));
        modified.line_changes.push(LineChange {
            kind: LineChangeKind::Insert,
            old_offset: None,
            new_offset: Some(2),
            text: "new line".to_string(),
        });
        DiffReport::new(
            vec![
                entry(DiffKind::Unchanged, Some(0), Some(0)),
                modified,
                entry(DiffKind::Added, None, Some(2)),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_summary_counts() {
        let text = SummaryReporter::new()
            .no_color()
            .generate_diff_report(&sample(), &ReportConfig::default())
            .unwrap();
        assert!(text.contains("+1 segment added"));
        assert!(text.contains("~1 segment modified"));
        assert!(text.contains("2 → 3 segments"));
        assert!(!text.contains("No changes"));
    }

    #[test]
    fn test_table_hides_unchanged_by_default() {
        let reporter = TableReporter::new().no_color();
        let text = reporter
            .generate_diff_report(&sample(), &ReportConfig::default())
            .unwrap();
        assert!(!text.contains("unchanged   "));
        assert!(text.contains("+ new line"));
        assert!(text.contains("@2"));

        let with_unchanged = ReportConfig {
            include_unchanged: true,
            ..Default::default()
        };
        let text = reporter.generate_diff_report(&sample(), &with_unchanged).unwrap();
        assert!(text.contains("unchanged   "));
    }

    #[test]
    fn test_no_color_has_no_escapes() {
        let text = TableReporter::new()
            .no_color()
            .generate_diff_report(&sample(), &ReportConfig::default())
            .unwrap();
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_truncate_and_pad_by_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long segment label", 10), "a long ...");
        assert_eq!(UnicodeWidthStr::width(pad("日本語", 8).as_str()), 8);
    }

    fn similar() -> SimilarReport {
        SimilarReport {
            segments: 4,
            pairs: vec![
                SimilarPair {
                    source: 0,
                    target: 3,
                    source_path: "a.md:1".into(),
                    target_path: "b.md:2".into(),
                    similarity: 1.0,
                },
                SimilarPair {
                    source: 1,
                    target: 2,
                    source_path: "a.md:2".into(),
                    target_path: "b.md:1".into(),
                    similarity: 0.81,
                },
            ],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_summary_of_similar_pairs() {
        let text = SummaryReporter::new()
            .no_color()
            .generate_similar_report(&similar(), &ReportConfig::default())
            .unwrap();
        assert!(text.contains("2 similar pairs, 1 identical"));
        assert!(text.contains("closest: a.md:1 ~ b.md:2 (1.00)"));

        let empty = SummaryReporter::new()
            .no_color()
            .generate_similar_report(&SimilarReport::default(), &ReportConfig::default())
            .unwrap();
        assert!(empty.contains("No similar pairs"));
    }

    #[test]
    fn test_table_of_similar_pairs() {
        let text = TableReporter::new()
            .no_color()
            .generate_similar_report(&similar(), &ReportConfig::default())
            .unwrap();
        assert!(text.contains("0.81"));
        assert!(text.contains("#2 b.md:1"));
        assert!(text.contains("Total: 2 pairs among 4 segments"));
    }
}
