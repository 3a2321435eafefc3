//! mdbed: content-addressed semantic diff for restructured documents
//!
//! Compares two versions of a markdown file, source file, or plain text
//! document segment by segment, recognizing moved and lightly edited content.

#![allow(clippy::struct_excessive_bools, clippy::needless_pass_by_value)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use mdbed::{
    cli,
    config::{AppConfig, ConfigPreset, DiffPaths, Validatable},
    embedding::ProviderKind,
    matching::AssignmentMethod,
    pipeline::exit_codes,
    reports::ReportFormat,
    segment::SegmentationPolicy,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with policy support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSegmentation Policies:",
        "\n  markdown-sections, markdown-blocks, paragraphs, python, rust",
        "\n\nEmbedding Providers:",
        "\n  hash (built-in), http (OpenAI-compatible), cached-only",
        "\n\nOutput Formats:",
        "\n  json, summary, table, csv"
    )
}

#[derive(Parser)]
#[command(name = "mdbed")]
#[command(version, long_version = build_long_version())]
#[command(about = "Content-addressed semantic diff for restructured documents", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  No changes detected (or changes without --fail-on-change)
    1  Changes detected with --fail-on-change
    3  Error occurred

EXAMPLES:
    # Diff two revisions of a README
    mdbed diff README.old.md README.md

    # CI check with a stricter threshold
    mdbed diff old.md new.md -o summary --threshold 0.85 --fail-on-change

    # Export JSON with line-level detail for modified segments
    mdbed diff old.py new.py -o json --line-detail > diff.json

    # Compare two directory snapshots of the docs
    mdbed diff -r docs-v1/ docs-v2/

    # Find repeated or near-duplicate sections across a docs tree
    mdbed similar -r docs/ --threshold 0.8 -o csv -O pairs.csv

    # Inspect how a file is segmented
    mdbed segments docs/guide.md -o table")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that segment documents
#[derive(clap::Args)]
struct SegmentArgs {
    /// Segmentation policy (detected from the file extension if omitted)
    #[arg(long, value_enum)]
    policy: Option<SegmentationPolicy>,

    /// Treat trailing whitespace and surrounding blank lines as insignificant
    #[arg(long)]
    ignore_whitespace: bool,
}

/// Options controlling how directory inputs are expanded
#[derive(clap::Args)]
struct WalkArgs {
    /// Descend into subdirectories of directory inputs
    #[arg(short, long)]
    recursive: bool,

    /// Regex matched against file names in directories [default: markdown files]
    #[arg(short, long)]
    filter: Option<String>,
}

/// Arguments for the `diff` subcommand
#[derive(Parser)]
struct DiffArgs {
    /// Path to the old/baseline document or directory
    old: PathBuf,

    /// Path to the new document or directory
    new: PathBuf,

    /// Output format (auto detects TTY: table if interactive, summary otherwise)
    #[arg(short, long, default_value = "auto")]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Matching preset: strict, balanced, permissive
    #[arg(long)]
    preset: Option<String>,

    /// Similarity threshold (0.0-1.0), overrides the preset
    #[arg(long)]
    threshold: Option<f64>,

    /// Assignment strategy for similarity matches
    #[arg(long, value_enum)]
    assignment: Option<AssignmentMethod>,

    /// Attach line-level changes to modified segments
    #[arg(long)]
    line_detail: bool,

    #[command(flatten)]
    segment: SegmentArgs,

    #[command(flatten)]
    walk: WalkArgs,

    /// Embedding provider
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Do not read or write the persisted embedding cache
    #[arg(long)]
    no_cache: bool,

    /// Embedding cache file
    #[arg(long, env = "MDBED_CACHE")]
    cache_path: Option<PathBuf>,

    /// Include unchanged segments in human-readable output
    #[arg(long)]
    include_unchanged: bool,

    /// Exit with code 1 if any change is detected
    #[arg(long)]
    fail_on_change: bool,
}

/// Arguments for the `similar` subcommand
#[derive(Parser)]
struct SimilarArgs {
    /// Files or directories to search
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format (auto detects TTY: table if interactive, summary otherwise)
    #[arg(short, long, default_value = "auto")]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Matching preset: strict, balanced, permissive
    #[arg(long)]
    preset: Option<String>,

    /// Similarity threshold (0.0-1.0), overrides the preset
    #[arg(short, long)]
    threshold: Option<f64>,

    #[command(flatten)]
    segment: SegmentArgs,

    #[command(flatten)]
    walk: WalkArgs,

    /// Embedding provider
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Do not read or write the persisted embedding cache
    #[arg(long)]
    no_cache: bool,

    /// Embedding cache file
    #[arg(long, env = "MDBED_CACHE")]
    cache_path: Option<PathBuf>,
}

/// Arguments for the `list` subcommand
#[derive(Parser)]
struct ListArgs {
    /// Files or directories to expand
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    #[command(flatten)]
    walk: WalkArgs,
}

/// Arguments for the `segments` subcommand
#[derive(Parser)]
struct SegmentsArgs {
    /// Document or directory to segment
    path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "auto")]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    #[command(flatten)]
    segment: SegmentArgs,

    #[command(flatten)]
    walk: WalkArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents
    Diff(DiffArgs),

    /// List pairs of similar segments within files or directories
    Similar(SimilarArgs),

    /// List the segments of a document with their fingerprints
    Segments(SegmentsArgs),

    /// List the files that inputs expand to
    List(ListArgs),

    /// Inspect or clear the embedding cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,

        /// Embedding cache file
        #[arg(long, env = "MDBED_CACHE", global = true)]
        cache_path: Option<PathBuf>,
    },

    /// Show configuration, its schema, or an example file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print store location, model, and entry count
    Stats,
    /// Delete the store
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Generate JSON Schema for the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print an example .mdbed.yaml
    Example {
        /// Print the settings of a preset instead of the commented defaults
        #[arg(long, value_enum)]
        preset: Option<ConfigPreset>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let base = AppConfig::builder()
        .no_color(cli.no_color)
        .quiet(cli.quiet);

    match cli.command {
        Commands::Diff(args) => {
            let mut overrides = base
                .ignore_whitespace(args.segment.ignore_whitespace)
                .recursive(args.walk.recursive)
                .name_filter(args.walk.filter)
                .line_detail(args.line_detail)
                .cache_enabled(!args.no_cache)
                .cache_path(args.cache_path)
                .output_format(args.output)
                .output_file(args.output_file)
                .include_unchanged(args.include_unchanged)
                .fail_on_change(args.fail_on_change);
            if let Some(preset) = args.preset {
                overrides = overrides.preset(preset);
            }
            if let Some(threshold) = args.threshold {
                overrides = overrides.threshold(threshold);
            }
            if let Some(method) = args.assignment {
                overrides = overrides.assignment(method);
            }
            if let Some(policy) = args.segment.policy {
                overrides = overrides.policy(policy);
            }
            if let Some(provider) = args.provider {
                overrides = overrides.provider(provider);
            }

            let config = load_config(cli.config.as_deref(), &overrides.build())?;
            let paths = DiffPaths {
                old: args.old,
                new: args.new,
            };
            cli::run_diff(&config, &paths)
        }

        Commands::Similar(args) => {
            let mut overrides = base
                .ignore_whitespace(args.segment.ignore_whitespace)
                .recursive(args.walk.recursive)
                .name_filter(args.walk.filter)
                .cache_enabled(!args.no_cache)
                .cache_path(args.cache_path)
                .output_format(args.output)
                .output_file(args.output_file);
            if let Some(preset) = args.preset {
                overrides = overrides.preset(preset);
            }
            if let Some(threshold) = args.threshold {
                overrides = overrides.threshold(threshold);
            }
            if let Some(policy) = args.segment.policy {
                overrides = overrides.policy(policy);
            }
            if let Some(provider) = args.provider {
                overrides = overrides.provider(provider);
            }

            let config = load_config(cli.config.as_deref(), &overrides.build())?;
            cli::run_similar(&config, &args.paths)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::List(args) => {
            let overrides = base
                .recursive(args.walk.recursive)
                .name_filter(args.walk.filter)
                .output_file(args.output_file);
            let config = load_config(cli.config.as_deref(), &overrides.build())?;
            cli::run_list(&config, &args.paths)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Segments(args) => {
            let mut overrides = base
                .ignore_whitespace(args.segment.ignore_whitespace)
                .recursive(args.walk.recursive)
                .name_filter(args.walk.filter)
                .output_format(args.output)
                .output_file(args.output_file);
            if let Some(policy) = args.segment.policy {
                overrides = overrides.policy(policy);
            }

            let config = load_config(cli.config.as_deref(), &overrides.build())?;
            cli::run_segments(&config, &args.path)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Cache { action, cache_path } => {
            let config = load_config(cli.config.as_deref(), &base.cache_path(cache_path).build())?;
            match action {
                CacheAction::Stats => cli::run_cache_stats(&config)?,
                CacheAction::Clear => {
                    cli::run_cache_clear(&config)?;
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show => {
                    let (config, loaded_from) =
                        AppConfig::from_file_with_overrides(cli.config.as_deref(), &base.build());
                    cli::run_config_show(&config, loaded_from.as_deref())?;
                }
                ConfigAction::Schema { output } => cli::run_config_schema(output.as_deref())?,
                ConfigAction::Example { preset } => cli::run_config_example(preset)?,
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "mdbed", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }
    }
}

/// Merge file config with CLI overrides and reject invalid settings.
fn load_config(path: Option<&std::path::Path>, overrides: &AppConfig) -> Result<AppConfig> {
    let (config, loaded_from) = AppConfig::from_file_with_overrides(path, overrides);
    if let Some(path) = loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let errors = config.validate();
    if !errors.is_empty() {
        let details = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n  ");
        anyhow::bail!("invalid configuration:\n  {details}");
    }
    Ok(config)
}
