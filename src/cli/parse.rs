//! CLI parse: clap types for shotforge. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Shotforge CLI - framed store screenshots from a browser-hosted design tool
#[derive(Parser, Debug)]
#[command(name = "shotforge")]
#[command(about = "Generate framed, localized store screenshots for every configured size")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project configuration file (TOML or JSON)
    #[arg(long, global = true, default_value = "shotforge.toml")]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate every artifact for every locale and size
    Generate {
        /// Design tool address; skips probing the local instance
        #[arg(long)]
        base_url: Option<String>,
        /// Restrict the run to these size labels (repeatable)
        #[arg(long = "size")]
        sizes: Vec<String>,
        /// Restrict the run to these locales (repeatable)
        #[arg(long = "locale")]
        locales: Vec<String>,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
        /// Write the run summary as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Load and validate the configuration
    Validate,
    /// Show the per-size schedule and missing source files without generating
    Plan,
}
