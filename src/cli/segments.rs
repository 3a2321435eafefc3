//! Segments command handler.
//!
//! Lists the segments of one document (or directory) with their
//! fingerprints, which is useful for checking how an input will be split
//! before diffing it.

use crate::addressing::ContentAddresser;
use crate::config::AppConfig;
use crate::model::Version;
use crate::pipeline::{output_segments, parse_input, resolve_input_policy};
use crate::reports::SegmentListing;
use anyhow::Result;
use std::path::Path;

/// Run the segments command.
pub fn run_segments(config: &AppConfig, path: &Path) -> Result<()> {
    let policy = resolve_input_policy(config, path);
    let parsed = parse_input(config, path, policy, Version::Old)?;

    let addresser = ContentAddresser::with_ignore_whitespace(config.matching.ignore_whitespace);
    let listing = SegmentListing::from_document(&parsed.document, parsed.policy_label(), &addresser);
    output_segments(config, &listing)
}
