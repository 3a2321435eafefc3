//! Diff command handler.
//!
//! Implements the `diff` subcommand for comparing two documents or two
//! directory snapshots.

use crate::config::{AppConfig, DiffPaths};
use crate::diff::DiffReport;
use crate::embedding::CancellationToken;
use crate::model::Version;
use crate::pipeline::{compute_diff, exit_codes, output_report, parse_input, resolve_input_policy};
use crate::reports::ReportMetadata;
use anyhow::Result;

/// Run the diff command, returning the desired exit code.
///
/// Both documents are segmented with the same policy: the configured one, or
/// the one detected from the old document's path. Directory inputs detect
/// the policy of each file unless one is configured.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_diff(config: &AppConfig, paths: &DiffPaths) -> Result<i32> {
    let policy = resolve_input_policy(config, &paths.old);

    let old = parse_input(config, &paths.old, policy, Version::Old)?;
    let new = parse_input(config, &paths.new, policy, Version::New)?;

    let output = compute_diff(config, &old, &new, &CancellationToken::new())?;
    let exit_code = determine_exit_code(config, &output.report);

    let metadata = ReportMetadata {
        old_path: Some(old.display_path()),
        new_path: Some(new.display_path()),
        policy: Some(old.policy_label()),
        model: Some(output.model),
        threshold: Some(config.matching.to_match_config().threshold),
        ..ReportMetadata::new()
    };
    output_report(config, &output.report, metadata)?;

    Ok(exit_code)
}

/// Determine the appropriate exit code based on diff results and config flags.
fn determine_exit_code(config: &AppConfig, report: &DiffReport) -> i32 {
    if config.behavior.fail_on_change && report.has_changes() {
        return exit_codes::CHANGES_DETECTED;
    }
    exit_codes::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportFormat;
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config(out: &Path, fail_on_change: bool) -> AppConfig {
        AppConfig::builder()
            .cache_enabled(false)
            .output_format(ReportFormat::Json)
            .output_file(Some(out.to_path_buf()))
            .fail_on_change(fail_on_change)
            .quiet(true)
            .build()
    }

    #[test]
    fn test_fail_on_change_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DiffPaths {
            old: write(dir.path(), "old.md", "# A\n\none\n\n# B\n\ntwo\n"),
            new: write(dir.path(), "new.md", "# B\n\ntwo\n\n# A\n\none\n"),
        };
        let out = dir.path().join("report.json");

        assert_eq!(run_diff(&config(&out, true), &paths).unwrap(), exit_codes::CHANGES_DETECTED);
        assert_eq!(run_diff(&config(&out, false), &paths).unwrap(), exit_codes::SUCCESS);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["summary"]["moved"], 2);
        assert_eq!(value["metadata"]["policy"], "markdown-sections");
        assert_eq!(value["metadata"]["model"], "hash-v1");
    }

    #[test]
    fn test_model_metadata_follows_provider() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DiffPaths {
            old: write(dir.path(), "old.txt", "one\n"),
            new: write(dir.path(), "new.txt", "two\n"),
        };
        let out = dir.path().join("report.json");
        // A configured model name is ignored by the built-in provider
        let mut config = config(&out, false);
        config.embedding.model = "text-embedding-3-small".to_string();
        run_diff(&config, &paths).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["metadata"]["model"], "hash-v1");
    }

    #[test]
    fn test_directory_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        for side in ["v1", "v2"] {
            std::fs::create_dir(dir.path().join(side)).unwrap();
        }
        write(&dir.path().join("v1"), "guide.md", "# Setup\n\ninstall it\n\n# Use\n\nrun it\n");
        write(&dir.path().join("v2"), "guide.md", "# Use\n\nrun it\n\n# Setup\n\ninstall it\n");
        write(&dir.path().join("v2"), "zz-faq.md", "# FAQ\n\nquestions\n");
        let paths = DiffPaths {
            old: dir.path().join("v1"),
            new: dir.path().join("v2"),
        };
        let out = dir.path().join("report.json");
        run_diff(&config(&out, false), &paths).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["summary"]["moved"], 2);
        assert_eq!(value["summary"]["added"], 1);
        assert_eq!(value["metadata"]["policy"], "per-file");
        let added = value["entries"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["kind"] == "added")
            .unwrap();
        assert_eq!(added["new_path"], "zz-faq.md:1");
    }

    #[test]
    fn test_identical_documents_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DiffPaths {
            old: write(dir.path(), "old.txt", "same\n\ntext\n"),
            new: write(dir.path(), "new.txt", "same\n\ntext\n"),
        };
        let out = dir.path().join("report.json");
        assert_eq!(run_diff(&config(&out, true), &paths).unwrap(), exit_codes::SUCCESS);
    }

    #[test]
    fn test_missing_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DiffPaths {
            old: dir.path().join("missing.md"),
            new: write(dir.path(), "new.md", "# A\n"),
        };
        let out = dir.path().join("report.json");
        assert!(run_diff(&config(&out, false), &paths).is_err());
    }
}
