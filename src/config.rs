use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::rules::DEFAULT_MAX_ASSET_BYTES;

const CONFIG_DIR: &str = ".frontlint";

fn default_read_timeout_ms() -> u64 {
    5_000
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Settings for the `check` command
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CheckConfig {
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_asset_bytes: Option<u64>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub strict: Option<bool>,
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// Globs, relative to the catalog root, of paths to skip
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub check: CheckConfig,
}

/// Resolved options for one validation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub read_timeout: Duration,
    pub max_asset_bytes: u64,
    pub jobs: usize,
    pub strict: bool,
    pub exclude: Vec<Pattern>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(default_read_timeout_ms()),
            max_asset_bytes: DEFAULT_MAX_ASSET_BYTES,
            jobs: default_jobs(),
            strict: false,
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration for a catalog root
    /// Priority: local (<root>/.frontlint/config.local.toml) > project (<root>/.frontlint/config.toml) > user (~/.frontlint/config.toml)
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Config::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                config.merge(Self::load_from(&user_config)?);
            }
        }

        for path in Self::project_paths(root) {
            if path.exists() {
                config.merge(Self::load_from(&path)?);
            }
        }

        Ok(config)
    }

    fn project_paths(root: &Path) -> [PathBuf; 2] {
        let dir = root.join(CONFIG_DIR);
        [dir.join("config.toml"), dir.join("config.local.toml")]
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Merge another config into this one (other takes priority)
    /// Exclude lists are concatenated; scalars are overridden if set
    pub fn merge(&mut self, other: Config) {
        self.exclude.extend(other.exclude);

        if other.check.read_timeout_ms.is_some() {
            self.check.read_timeout_ms = other.check.read_timeout_ms;
        }
        if other.check.max_asset_bytes.is_some() {
            self.check.max_asset_bytes = other.check.max_asset_bytes;
        }
        if other.check.jobs.is_some() {
            self.check.jobs = other.check.jobs;
        }
        if other.check.strict.is_some() {
            self.check.strict = other.check.strict;
        }
    }

    /// Resolve into run options, compiling exclude globs
    pub fn run_options(&self) -> Result<RunOptions> {
        let exclude = self
            .exclude
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude glob '{}'", p)))
            .collect::<Result<Vec<_>>>()?;

        Ok(RunOptions {
            read_timeout: Duration::from_millis(
                self.check
                    .read_timeout_ms
                    .unwrap_or_else(default_read_timeout_ms),
            ),
            max_asset_bytes: self.check.max_asset_bytes.unwrap_or(DEFAULT_MAX_ASSET_BYTES),
            jobs: self.check.jobs.unwrap_or_else(default_jobs).max(1),
            strict: self.check.strict.unwrap_or(false),
            exclude,
        })
    }
}
