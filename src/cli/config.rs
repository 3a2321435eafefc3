//! Config command handlers.

use crate::config::{generate_example_config, generate_json_schema, AppConfig, ConfigPreset};
use anyhow::{Context, Result};
use std::path::Path;

/// Print or write the JSON Schema of the config file format.
pub fn run_config_schema(output: Option<&Path>) -> Result<()> {
    let schema = generate_json_schema();
    match output {
        Some(path) => {
            std::fs::write(path, &schema)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Schema written to {}", path.display());
        }
        None => println!("{schema}"),
    }
    Ok(())
}

/// Print an example config file, either the commented default or a preset.
pub fn run_config_example(preset: Option<ConfigPreset>) -> Result<()> {
    let content = match preset {
        Some(preset) => {
            let yaml = serde_yaml::to_string(&AppConfig::from_preset(preset))
                .context("failed to serialize config")?;
            format!("# mdbed configuration ({preset} preset)\n{yaml}")
        }
        None => generate_example_config(),
    };
    print!("{content}");
    Ok(())
}

/// Print the effective configuration and where it was loaded from.
pub fn run_config_show(config: &AppConfig, loaded_from: Option<&Path>) -> Result<()> {
    match loaded_from {
        Some(path) => eprintln!("# Loaded from: {}", path.display()),
        None => eprintln!("# No config file found; showing defaults"),
    }
    let yaml = serde_yaml::to_string(config).context("failed to serialize config")?;
    print!("{yaml}");
    Ok(())
}
