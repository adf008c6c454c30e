//! Command-line interface definitions.
//!
//! Defines the CLI structure for regimewatch using `clap`. Every subcommand
//! reads the same TOML configuration; the database path inside it decides
//! which cache, history and audit log are used.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Market regime snapshot, history and source health
#[derive(Parser, Debug)]
#[command(name = "regimewatch")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Apply the choice to owo-colors. `Auto` leaves terminal detection on.
    pub fn apply(&self) {
        match self {
            Self::Auto => owo_colors::unset_override(),
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every metric once and print the aggregate regime
    Snapshot,

    /// Replay stored history into one regime per day
    History(HistoryArgs),

    /// Show the latest fetch outcome per metric
    Health(HealthArgs),

    /// Manage the metric cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Arguments for `history`.
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Number of trailing days to replay
    #[arg(long, default_value = "30")]
    pub days: u32,

    /// Write the replay to a file instead of a table (.json, otherwise CSV)
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

/// Arguments for `health`.
#[derive(Parser, Debug)]
pub struct HealthArgs {
    /// Only consider attempts from the last N hours
    #[arg(long, default_value = "24")]
    pub hours: u32,
}

/// Subcommands for `cache`.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Remove every cached metric value
    Clear,
}
