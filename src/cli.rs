//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::outputs::OutputType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Documentation site server and output catalogue tools
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: docsite.toml)
    #[arg(short = 'C', long, default_value = "docsite.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the docs API, the sitemap and the public directory
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds a parsed document stays cached
        #[arg(long)]
        cache_ttl: Option<u64>,
    },

    /// Write sitemap.xml from the topic data directory
    Sitemap {
        /// Output file (relative to root)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the cross-type summary from every output manifest
    Summary,

    /// List catalogued files, fetched through the manifest cache
    Files {
        /// Only this output type (colab, jupyter, llm-rag, latex, mdbook, api-docs, json, vue)
        #[arg(short = 't', long = "type")]
        output_type: Option<OutputType>,

        /// Override `[outputs.base_url]`
        #[arg(long = "base-url")]
        base_url: Option<String>,

        /// Print per-type counts from the summary instead of files
        #[arg(long)]
        counts: bool,
    },
}
