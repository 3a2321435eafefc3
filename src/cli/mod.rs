//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the logic for a specific CLI subcommand and leaves
//! process exit to the caller.

mod cache;
mod config;
mod diff;
mod list;
mod segments;
mod similar;

pub use cache::{run_cache_clear, run_cache_stats};
pub use config::{run_config_example, run_config_schema, run_config_show};
pub use diff::run_diff;
pub use list::run_list;
pub use segments::run_segments;
pub use self::similar::run_similar;

// Re-export config types used by handlers
pub use crate::config::{AppConfig, DiffPaths};
