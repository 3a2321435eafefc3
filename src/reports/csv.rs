//! CSV report generator.
//!
//! Generates comma-separated reports for spreadsheet import and data
//! analysis pipelines. Every entry is written, unchanged ones included.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, SegmentListing};
use crate::diff::{DiffReport, ReportWarning, SimilarReport};
use std::fmt::Write;

/// CSV report generator.
pub struct CsvReporter;

impl CsvReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReporter {
    fn generate_diff_report(
        &self,
        report: &DiffReport,
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut content = String::new();

        content.push_str("# Entries\n");
        content.push_str("Status,Old Position,New Position,Similarity,Old Path,New Path\n");
        for entry in &report.entries {
            writeln!(
                content,
                "{},{},{},{},\"{}\",\"{}\"",
                entry.kind,
                optional(entry.old_position),
                optional(entry.new_position),
                entry.similarity.map_or_else(|| "-".to_string(), |s| format!("{s:.4}")),
                escape_csv(entry.old_path.as_deref().unwrap_or("-")),
                escape_csv(entry.new_path.as_deref().unwrap_or("-"))
            )?;
        }

        write_warnings(&mut content, &report.warnings)?;
        Ok(content)
    }

    fn generate_segments_report(&self, listing: &SegmentListing) -> Result<String, ReportError> {
        let mut content = String::new();
        content.push_str("Index,Path,Kind,Fingerprint,Start Line,End Line,Preview\n");
        for row in &listing.segments {
            writeln!(
                content,
                "{},\"{}\",{},{},{},{},\"{}\"",
                row.index,
                escape_csv(&row.path),
                row.kind,
                row.fingerprint,
                row.start_line,
                row.end_line,
                escape_csv(&row.preview)
            )?;
        }
        Ok(content)
    }

    fn generate_similar_report(
        &self,
        report: &SimilarReport,
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut content = String::new();

        content.push_str("# Pairs\n");
        content.push_str("Source,Target,Similarity,Source Path,Target Path\n");
        for pair in &report.pairs {
            writeln!(
                content,
                "{},{},{:.4},\"{}\",\"{}\"",
                pair.source,
                pair.target,
                pair.similarity,
                escape_csv(&pair.source_path),
                escape_csv(&pair.target_path)
            )?;
        }

        write_warnings(&mut content, &report.warnings)?;
        Ok(content)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}

fn write_warnings(content: &mut String, warnings: &[ReportWarning]) -> Result<(), ReportError> {
    if warnings.is_empty() {
        return Ok(());
    }
    content.push_str("\n# Warnings\n");
    content.push_str("Version,Position,Path,Fingerprint,Message\n");
    for warning in warnings {
        writeln!(
            content,
            "{},{},\"{}\",{},\"{}\"",
            warning.version,
            warning.position,
            escape_csv(&warning.path),
            warning.fingerprint,
            escape_csv(&warning.message)
        )?;
    }
    Ok(())
}

fn optional(position: Option<usize>) -> String {
    position.map_or_else(|| "-".to_string(), |p| p.to_string())
}

/// Escape a quoted CSV field.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"").replace(['\n', '\r'], " ")
}
