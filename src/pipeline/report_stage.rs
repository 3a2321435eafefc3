//! Report output stage.

use super::{auto_detect_format, should_use_color, write_output, OutputTarget, PipelineError};
use crate::config::AppConfig;
use crate::diff::{DiffReport, SimilarReport};
use crate::reports::{create_reporter, ReportConfig, ReportMetadata, SegmentListing};
use anyhow::Result;

/// Render a diff report and write it to the configured destination.
pub fn output_report(
    config: &AppConfig,
    report: &DiffReport,
    metadata: ReportMetadata,
) -> Result<()> {
    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target);
    let colored = should_use_color(config.output.no_color) && target.is_terminal();

    let report_config = ReportConfig {
        include_unchanged: config.output.include_unchanged,
        metadata,
    };
    let rendered = create_reporter(format, colored)
        .generate_diff_report(report, &report_config)
        .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;

    write_output(&rendered, &target, config.behavior.quiet)
}

/// Render a segment listing and write it to the configured destination.
pub fn output_segments(config: &AppConfig, listing: &SegmentListing) -> Result<()> {
    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target);
    let colored = should_use_color(config.output.no_color) && target.is_terminal();

    let rendered = create_reporter(format, colored)
        .generate_segments_report(listing)
        .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;

    write_output(&rendered, &target, config.behavior.quiet)
}

/// Render similar segment pairs and write them to the configured destination.
pub fn output_similar(
    config: &AppConfig,
    report: &SimilarReport,
    metadata: ReportMetadata,
) -> Result<()> {
    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target);
    let colored = should_use_color(config.output.no_color) && target.is_terminal();

    let report_config = ReportConfig {
        include_unchanged: false,
        metadata,
    };
    let rendered = create_reporter(format, colored)
        .generate_similar_report(report, &report_config)
        .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;

    write_output(&rendered, &target, config.behavior.quiet)
}
