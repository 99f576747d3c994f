//! Configuration file handling for windscope
//!
//! One TOML document carries both the engine configuration and a `[cli]`
//! section with output preferences. Lookup order: `--config`, then
//! `<config_dir>/windscope/config.toml`, then built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use windscope_engine::config::{FsConfig, StoreConfig};
use windscope_engine::EngineConfig;

use crate::output::OutputFormat;

/// Output preferences stored in the `[cli]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliSection {
    /// Default output format (`table`, `json`, `csv`)
    pub output: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct CliFile {
    #[serde(default)]
    cli: CliSection,
}

/// Configuration for the CLI tool
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub engine: EngineConfig,
    pub cli: CliSection,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let engine = EngineConfig::from_toml_str(content)?;
        let file: CliFile = toml::from_str(content)?;
        Ok(Self {
            engine,
            cli: file.cli,
        })
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("windscope");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(
        &self,
        store_root: Option<&Path>,
        output: Option<OutputFormat>,
        no_color: bool,
    ) -> Result<MergedConfig> {
        let mut engine = self.engine.clone();
        if let Some(root) = store_root {
            engine.store = StoreConfig::Fs(FsConfig {
                root: root.to_path_buf(),
            });
        }

        let output = match (output, self.cli.output.as_deref()) {
            (Some(format), _) => format,
            (None, Some(name)) => OutputFormat::from_str(name, true)
                .map_err(|e| anyhow::anyhow!("Invalid output format '{}' in config: {}", name, e))?,
            (None, None) => OutputFormat::default(),
        };

        Ok(MergedConfig {
            engine,
            output,
            no_color: no_color || self.cli.no_color.unwrap_or(false),
        })
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub engine: EngineConfig,
    pub output: OutputFormat,
    pub no_color: bool,
}
