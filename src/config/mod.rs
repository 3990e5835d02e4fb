//! Site configuration management for `docsite.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                           |
//! |-------------|---------------------------------------------------|
//! | `[base]`    | Public URL and project root                       |
//! | `[data]`    | Topic/index data directory candidates             |
//! | `[outputs]` | Generated artifact tree and its client-facing URL |
//! | `[github]`  | Repository used for source and Colab links        |
//! | `[serve]`   | HTTP server (port, interface, cache policy)       |
//! | `[sitemap]` | Sitemap output                                    |
//!
//! # Example
//!
//! ```toml
//! [base]
//! url = "https://mathhook.org"
//!
//! [data]
//! production = ".output/public/data"
//! development = "public/data"
//!
//! [outputs]
//! base_url = "https://mathhook.org/outputs"
//!
//! [serve]
//! port = 5277
//! cache_ttl = 300
//! ```

mod base;
mod data;
pub mod defaults;
mod error;
mod github;
mod outputs;
mod serve;
mod sitemap;

pub use data::DataConfig;
pub use error::ConfigError;
pub use github::GithubConfig;

use base::BaseConfig;
use outputs::OutputsConfig;
use serve::ServeConfig;
use sitemap::SitemapConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing docsite.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub base: BaseConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub outputs: OutputsConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub sitemap: SitemapConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.base.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Full path of the cross-type summary inside the outputs directory.
    pub fn summary_path(&self) -> PathBuf {
        self.outputs.dir.join(&self.outputs.summary)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = PathBuf::from(shellexpand::tilde(&root.to_string_lossy()).into_owned());
        self.update_path_with_root(&root, &cli.config);

        match &cli.command {
            Commands::Serve {
                interface,
                port,
                cache_ttl,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.cache_ttl, cache_ttl.as_ref());
            }
            Commands::Sitemap { output } => {
                if let Some(output) = output {
                    self.sitemap.path = Self::normalize_path(&root.join(output));
                }
            }
            Commands::Files { base_url, .. } => {
                Self::update_option(&mut self.outputs.base_url, base_url.as_ref());
            }
            Commands::Summary => {}
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every configured path against `root` and make it absolute
    fn update_path_with_root(&mut self, root: &Path, config: &Path) {
        let root = Self::normalize_path(root);
        self.base.root = Some(root.clone());
        self.config_path = Self::normalize_path(&root.join(config));

        self.data.production = Self::normalize_path(&root.join(&self.data.production));
        self.data.development = Self::normalize_path(&root.join(&self.data.development));
        self.outputs.dir = Self::normalize_path(&root.join(&self.outputs.dir));
        self.serve.public = Self::normalize_path(&root.join(&self.serve.public));
        self.sitemap.path = Self::normalize_path(&root.join(&self.sitemap.path));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    pub fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self, cli: &Cli) -> Result<()> {
        if !self.base.url.starts_with("http") {
            bail!(ConfigError::invalid(
                "[base.url]",
                "must start with http:// or https://"
            ));
        }

        let index = Path::new(&self.data.index);
        if index.components().count() != 1 || index.extension().is_none_or(|ext| ext != "json") {
            bail!(ConfigError::invalid(
                "[data.index]",
                "must be a plain `.json` file name"
            ));
        }

        if self.serve.cache_control.contains(['\r', '\n']) {
            bail!(ConfigError::invalid(
                "[serve.cache_control]",
                "must be a single header line"
            ));
        }

        if matches!(cli.command, Commands::Files { .. }) && !self.outputs.base_url.starts_with("http")
        {
            bail!(ConfigError::invalid(
                "[outputs.base_url]",
                "must start with http:// or https:// to be fetched"
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
