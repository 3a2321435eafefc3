//! Similar command handler.
//!
//! Searches files and directories for segments that repeat or nearly repeat
//! each other, across file boundaries.

use crate::config::AppConfig;
use crate::embedding::CancellationToken;
use crate::model::Version;
use crate::pipeline::{compute_similar, output_similar, parse_inputs};
use crate::reports::ReportMetadata;
use anyhow::Result;
use std::path::PathBuf;

/// Run the similar command.
pub fn run_similar(config: &AppConfig, paths: &[PathBuf]) -> Result<()> {
    let input = parse_inputs(config, paths, Version::Old)?;
    let output = compute_similar(config, &input, &CancellationToken::new())?;

    let metadata = ReportMetadata {
        inputs: paths.iter().map(|p| p.display().to_string()).collect(),
        policy: Some(input.policy_label()),
        model: Some(output.model),
        threshold: Some(config.matching.to_match_config().threshold),
        ..ReportMetadata::new()
    };
    output_similar(config, &output.report, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportFormat;

    #[test]
    fn test_repeated_section_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let section = "# Install\n\nRun cargo install mdbed to get the binary.\n";
        std::fs::write(dir.path().join("a.md"), format!("# Intro\n\nWelcome.\n\n{section}")).unwrap();
        std::fs::write(dir.path().join("b.md"), section).unwrap();
        let out = dir.path().join("pairs.json");

        let config = AppConfig::builder()
            .cache_enabled(false)
            .output_format(ReportFormat::Json)
            .output_file(Some(out.clone()))
            .quiet(true)
            .build();
        run_similar(&config, &[dir.path().to_path_buf()]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(value["segments"], 3);
        let top = &value["pairs"][0];
        assert!(top["source_path"].as_str().unwrap().ends_with("a.md:2"));
        assert!(top["target_path"].as_str().unwrap().ends_with("b.md:1"));
        assert_eq!(top["similarity"], 1.0);
        assert_eq!(value["metadata"]["model"], "hash-v1");
    }
}
