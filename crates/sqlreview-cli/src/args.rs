//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sqlreview")]
#[command(author, version, about = "SQL review tool")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check SQL files against review rules
    Check {
        /// SQL files to check (supports glob patterns)
        files: Vec<PathBuf>,

        /// SQL dialect [default: postgresql]
        #[arg(short, long, env = "SQLREVIEW_DIALECT")]
        dialect: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Only run these rules (repeatable)
        #[arg(short, long = "rule", value_name = "RULE_ID")]
        rules: Vec<String>,

        /// Configuration file (defaults to the nearest sqlreview.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// List registered rules
    Rules {
        /// SQL dialect [default: postgresql]
        #[arg(short, long, env = "SQLREVIEW_DIALECT")]
        dialect: Option<String>,

        /// Configuration file (defaults to the nearest sqlreview.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Display the tables found in a SQL file (for debugging)
    Tables {
        /// SQL file to analyze
        file: PathBuf,

        /// SQL dialect
        #[arg(short, long, default_value = "postgresql")]
        dialect: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
    /// SARIF output (for GitHub Code Scanning)
    Sarif,
}
