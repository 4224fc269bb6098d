//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the medical report reader.
#[derive(Parser)]
#[command(name = "medreport")]
#[command(about = "Read medical reports in plain language")]
#[command(version)]
pub struct Cli {
    /// Gemini API key
    #[arg(long = "api-key", env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Override the Gemini API base URL
    #[arg(long = "base-url", env = "GEMINI_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
