//! Pipeline orchestration for document comparisons.
//!
//! Shared read → segment → diff → report logic used by the CLI command
//! handlers.

mod diff_stage;
mod inputs;
mod output;
mod parse;
mod report_stage;

pub use diff_stage::{compute_diff, compute_similar, open_cache, StageOutput};
pub use inputs::{collect_files, name_filter, walk_directory, DEFAULT_NAME_FILTER};
pub use output::{auto_detect_format, should_use_color, write_output, OutputTarget};
pub use parse::{
    parse_document_with_context, parse_input, parse_inputs, resolve_input_policy, resolve_policy,
    ParsedDocument,
};
pub use report_stage::{output_report, output_segments, output_similar};

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to read or segment a document
    #[error("Parse failed for {path}: {source}")]
    ParseFailed {
        path: String,
        source: anyhow::Error,
    },

    /// Diff computation failed
    #[error("Diff failed: {source}")]
    DiffFailed {
        #[source]
        source: anyhow::Error,
    },

    /// Report generation or output failed
    #[error("Report failed: {source}")]
    ReportFailed {
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no changes detected (or changes without --fail-on-change)
    pub const SUCCESS: i32 = 0;
    /// Changes were detected
    pub const CHANGES_DETECTED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}
