//! JSON report generator.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, SegmentListing};
use crate::diff::{DiffReport, SimilarReport};
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
    /// Emit the bare report without the metadata envelope
    bare: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pretty: true,
            bare: false,
        }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Serialize only the [`DiffReport`], which is byte-identical across
    /// runs with the same inputs.
    #[must_use]
    pub const fn bare(mut self) -> Self {
        self.bare = true;
        self
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String, ReportError> {
        Ok(if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        })
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_diff_report(
        &self,
        report: &DiffReport,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        if self.bare {
            return self.render(report);
        }
        let output = JsonDiffOutput {
            metadata: JsonReportMetadata::from_config(config),
            report,
        };
        self.render(&output)
    }

    fn generate_segments_report(&self, listing: &SegmentListing) -> Result<String, ReportError> {
        self.render(listing)
    }

    fn generate_similar_report(
        &self,
        report: &SimilarReport,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        if self.bare {
            return self.render(report);
        }
        let output = JsonSimilarOutput {
            metadata: JsonReportMetadata::from_config(config),
            report,
        };
        self.render(&output)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

// JSON structures for serialization

#[derive(Serialize)]
struct JsonDiffOutput<'a> {
    metadata: JsonReportMetadata,
    #[serde(flatten)]
    report: &'a DiffReport,
}

#[derive(Serialize)]
struct JsonSimilarOutput<'a> {
    metadata: JsonReportMetadata,
    #[serde(flatten)]
    report: &'a SimilarReport,
}

#[derive(Serialize)]
struct JsonReportMetadata {
    tool: ToolInfo,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    inputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
}

impl JsonReportMetadata {
    fn from_config(config: &ReportConfig) -> Self {
        let meta = &config.metadata;
        Self {
            tool: ToolInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            generated_at: Utc::now().to_rfc3339(),
            old_path: meta.old_path.clone(),
            new_path: meta.new_path.clone(),
            inputs: meta.inputs.clone(),
            policy: meta.policy.clone(),
            model: meta.model.clone(),
            threshold: meta.threshold,
        }
    }
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}
