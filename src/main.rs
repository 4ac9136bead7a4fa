//! Cadence - cron job scheduler and resilient event publisher
//!
//! Main entry point for the Cadence CLI.

mod cli;
mod cmd_check;
mod cmd_next;
mod cmd_run;
mod jobs;

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Context;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cadence_config::{ConfigLoader, LoggingConfig};

use crate::cli::{Cli, Commands};

/// Keeps the non-blocking file writer flushing until the process exits.
static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Resolve the log directory, expanding `~`.
fn log_directory(logging: &LoggingConfig) -> Option<PathBuf> {
    logging
        .directory
        .as_ref()
        .map(|dir| PathBuf::from(ConfigLoader::expand_path(&dir.to_string_lossy())))
}

/// Initialize tracing with console and file output.
///
/// `RUST_LOG` takes precedence over the configured level. Log files rotate
/// daily and only the newest `max_files` are kept.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let file_layer = match log_directory(logging) {
        Some(log_dir) => {
            std::fs::create_dir_all(&log_dir).with_context(|| {
                format!("Failed to create log directory {}", log_dir.display())
            })?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&logging.file_prefix)
                .filename_suffix("log")
                .max_log_files(logging.max_files)
                .build(&log_dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = GUARD.set(guard);

            let layer = if logging.json {
                fmt::layer().json().with_writer(non_blocking).boxed()
            } else {
                fmt::layer().with_writer(non_blocking).with_ansi(false).boxed()
            };
            Some(layer)
        }
        None => None,
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer (human-readable text format with colors)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if cli.command.requires_config() {
        ConfigLoader::load(&cli.config)
    } else {
        ConfigLoader::load_or_default(&cli.config)
    }
    .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Run => cmd_run::run(config).await,
        Commands::Check => cmd_check::check(&config),
        Commands::Next {
            expression,
            timezone,
            count,
        } => cmd_next::next(&expression, &timezone, count),
    }
}
