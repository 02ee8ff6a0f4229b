//! Command line argument parsing for the navscore CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// NavScore - navigation suggestions for analytics dashboards
#[derive(Parser, Debug, Clone)]
#[command(name = "navscore")]
#[command(about = "Score navigation suggestions from recorded dashboard interactions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct NavScoreArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl NavScoreArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replay an interaction log and score suggestions for one request
    Recommend(RecommendArgs),

    /// List the destinations of a catalog
    Catalog(CatalogArgs),
}

/// Arguments for scoring a request
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// Page the user is on
    #[arg(value_name = "CURRENT_PAGE")]
    pub current_page: String,

    /// Requesting user; omit for an anonymous request
    #[arg(short, long)]
    pub user: Option<String>,

    /// Session identifier
    #[arg(short, long)]
    pub session: Option<String>,

    /// Pages visited earlier in the session (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub previous: Vec<String>,

    /// Free-text query typed by the user
    #[arg(long)]
    pub query: Option<String>,

    /// Preferred categories used to break score ties (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub prefer: Vec<String>,

    /// Catalog file (JSON array); defaults to the built-in catalog
    #[arg(short, long, value_name = "CATALOG_FILE")]
    pub catalog: Option<PathBuf>,

    /// Interaction log (JSON lines of {user_id, type, target, timestamp})
    #[arg(short, long, value_name = "INTERACTIONS_FILE")]
    pub interactions: Option<PathBuf>,

    /// Scorer configuration file (JSON)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Request time (RFC 3339); defaults to the latest logged interaction
    #[arg(long)]
    pub at: Option<String>,
}

/// Arguments for listing a catalog
#[derive(Parser, Debug, Clone)]
pub struct CatalogArgs {
    /// Catalog file (JSON array); defaults to the built-in catalog
    #[arg(value_name = "CATALOG_FILE")]
    pub catalog: Option<PathBuf>,

    /// Only list destinations of this category
    #[arg(long)]
    pub category: Option<String>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
