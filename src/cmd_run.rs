//! `cadence run`: schedule the configured jobs until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use cadence_config::Config;
use cadence_events::{EventPublisher, MemoryBroker};
use cadence_scheduler::{CronScheduler, JobRegistry};

use crate::cmd_check::ensure_valid;
use crate::jobs;

/// Run the scheduler in the foreground.
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting Cadence v{}", env!("CARGO_PKG_VERSION"));

    ensure_valid(&config)?;

    let broker = Arc::new(MemoryBroker::new());
    let publisher = Arc::new(EventPublisher::from_broker(
        broker,
        config.publisher.clone(),
    ));

    let registry = Arc::new(JobRegistry::new());
    let registered = jobs::register_jobs(&registry, &config.jobs, &publisher);
    info!("Registered {} job(s)", registered);

    let scheduler = CronScheduler::new(registry, config.scheduler.clone());
    scheduler.start().await;

    for job in scheduler.get_status().jobs {
        match job.next_run {
            Some(next) => info!("Job '{}' next runs at {}", job.name, next),
            None => info!("Job '{}' has no upcoming run", job.name),
        }
    }

    info!("Press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutting down");
    scheduler.stop();

    Ok(())
}
