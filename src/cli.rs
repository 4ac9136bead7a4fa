//! CLI definitions for Cadence.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cadence CLI.
#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cron job scheduler and resilient event publisher")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "cadence.toml", global = true, env = "CADENCE_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the configured jobs until interrupted
    Run,

    /// Validate the configuration and show when each job fires next
    Check,

    /// Print upcoming fire times of a cron expression
    Next {
        /// Cron expression (5 or 6 fields)
        expression: String,

        /// IANA timezone the expression is evaluated in
        #[arg(short, long, default_value = "UTC")]
        timezone: String,

        /// Number of fire times to print
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
}

impl Commands {
    /// Whether the command needs an existing configuration file.
    pub fn requires_config(&self) -> bool {
        !matches!(self, Commands::Next { .. })
    }
}
