//! docsite - documentation site server and output catalogue tools.

mod cli;
mod config;
mod docs;
mod files;
mod generator;
mod logger;
mod outputs;
mod serve;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use files::list_files;
use generator::{build_sitemap, build_summary};
use serve::serve_site;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Serve { .. } => serve_site(&config),
        Commands::Sitemap { .. } => build_sitemap(&config),
        Commands::Summary => build_summary(&config).map(|_| ()),
        Commands::Files {
            output_type,
            counts,
            ..
        } => list_files(&config, *output_type, *counts),
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is not an error: every section has defaults.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        log!("config"; "{} not found, using defaults", config_path.display());
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate(cli)?;

    Ok(config)
}
