//! List command handler.
//!
//! Prints the files that directory and file arguments expand to, one per
//! line, so filters can be checked before running a search.

use crate::config::AppConfig;
use crate::pipeline::{collect_files, write_output, OutputTarget};
use anyhow::Result;
use std::path::PathBuf;

/// Run the list command.
pub fn run_list(config: &AppConfig, paths: &[PathBuf]) -> Result<()> {
    let files = collect_files(paths, &config.segmentation)?;
    let listing = files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    let target = OutputTarget::from_option(config.output.file.clone());
    write_output(&listing, &target, config.behavior.quiet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("top.md"), "# t\n").unwrap();
        std::fs::write(dir.path().join("nested/deep.md"), "# d\n").unwrap();
        std::fs::write(dir.path().join("code.rs"), "fn main() {}\n").unwrap();
        let out = dir.path().join("files.txt");

        let config = AppConfig::builder()
            .recursive(true)
            .output_file(Some(out.clone()))
            .quiet(true)
            .build();
        run_list(&config, &[dir.path().to_path_buf()]).unwrap();

        let text = std::fs::read_to_string(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("deep.md"));
        assert!(lines[1].ends_with("top.md"));
    }
}
