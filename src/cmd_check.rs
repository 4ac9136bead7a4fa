//! `cadence check`: validate the configuration.

use anyhow::bail;
use tracing::warn;

use cadence_config::{Config, ConfigValidator};
use cadence_scheduler::CronScheduler;

/// Log validation warnings and fail on validation errors.
pub(crate) fn ensure_valid(config: &Config) -> anyhow::Result<()> {
    let result = ConfigValidator::validate(config);

    for warning in &result.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }

    if !result.is_valid() {
        for error in &result.errors {
            eprintln!("error: {}: {}", error.path, error.message);
        }
        bail!("Configuration has {} error(s)", result.errors.len());
    }

    Ok(())
}

/// Validate the configuration and print each job's next fire time.
pub(crate) fn check(config: &Config) -> anyhow::Result<()> {
    ensure_valid(config)?;

    if config.jobs.is_empty() {
        println!("Configuration is valid. No jobs configured.");
        return Ok(());
    }

    println!("{:<24} {:<20} {:<16} {}", "NAME", "SCHEDULE", "TIMEZONE", "NEXT RUN");
    println!("{}", "-".repeat(90));

    let mut invalid = 0;
    for job in &config.jobs {
        let timezone = job
            .timezone
            .as_deref()
            .unwrap_or(&config.scheduler.timezone);

        let next = if !job.enabled {
            "disabled".to_string()
        } else {
            match CronScheduler::next_runs(&job.schedule, timezone, 1) {
                Ok(runs) => runs
                    .first()
                    .map(|next| next.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string()),
                Err(e) => {
                    invalid += 1;
                    format!("invalid: {}", e)
                }
            }
        };

        println!("{:<24} {:<20} {:<16} {}", job.name, job.schedule, timezone, next);
    }

    if invalid > 0 {
        bail!("{} job(s) have an invalid schedule or timezone", invalid);
    }

    println!("\nConfiguration is valid.");
    Ok(())
}
