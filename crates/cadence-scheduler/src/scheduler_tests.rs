//! Tests for the cron scheduler.

use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::time::Duration;

use super::*;
use crate::error::SchedulerError;
use crate::trigger::schedules;

fn scheduler_with(config: SchedulerConfig) -> CronScheduler {
    CronScheduler::new(Arc::new(JobRegistry::new()), config)
}

fn counting_job(name: &str, schedule: &str, counter: Arc<AtomicU32>) -> JobDefinition {
    JobDefinition::new(name, schedule, move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(None)
        }
    })
}

fn failing_job(name: &str) -> JobDefinition {
    JobDefinition::new(name, schedules::EVERY_HOUR, || async {
        Err(anyhow::anyhow!("database unavailable"))
    })
}

#[tokio::test]
async fn test_new_scheduler_is_stopped() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    let status = scheduler.get_status();
    assert!(!status.is_running);
    assert_eq!(status.total_jobs, 0);
    assert!(status.jobs.is_empty());
}

#[tokio::test]
async fn test_schedule_job_creates_active_state() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    let counter = Arc::new(AtomicU32::new(0));

    assert!(scheduler.schedule_job(counting_job("sync", schedules::EVERY_HOUR, counter)));

    let status = scheduler.job_status("sync").unwrap();
    assert_eq!(status.schedule, "0 * * * *");
    assert_eq!(status.run_count, 0);
    assert_eq!(status.error_count, 0);
    assert!(!status.paused);
    assert!(status.next_run.is_some());
    assert!(status.last_result.is_none());
}

#[tokio::test]
async fn test_schedule_job_invalid_timezone_is_skipped() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    let job = counting_job("tz", schedules::EVERY_HOUR, Arc::new(AtomicU32::new(0)))
        .with_timezone("Atlantis/Capital");

    assert!(!scheduler.schedule_job(job));
    assert_eq!(scheduler.get_status().total_jobs, 0);
}

#[tokio::test]
async fn test_schedule_job_uses_scheduler_timezone_by_default() {
    let config = SchedulerConfig {
        timezone: "Not/AZone".to_string(),
        ..SchedulerConfig::default()
    };
    let scheduler = scheduler_with(config);

    let inherits = counting_job("inherits", schedules::EVERY_HOUR, Arc::new(AtomicU32::new(0)));
    assert!(!scheduler.schedule_job(inherits));

    let overrides = counting_job("overrides", schedules::EVERY_HOUR, Arc::new(AtomicU32::new(0)))
        .with_timezone("UTC");
    assert!(scheduler.schedule_job(overrides));
}

#[tokio::test]
async fn test_execute_unknown_job_returns_failed_result() {
    let scheduler = scheduler_with(SchedulerConfig::default());

    let result = scheduler.inner.execute_job("ghost").await.unwrap();
    assert!(!result.success);
    assert_eq!(result.job_name, "ghost");
    assert!(scheduler.get_status().jobs.is_empty());
}

#[tokio::test]
async fn test_execute_records_metadata() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    scheduler.schedule_job(JobDefinition::new("report", schedules::EVERY_HOUR, || async {
        let mut meta = crate::JobMetadata::new();
        meta.insert("rows".to_string(), serde_json::json!(7));
        Ok(Some(meta))
    }));

    let result = scheduler.run_job_now("report").await.unwrap();
    assert!(result.success);
    assert!(result.finished_at >= result.started_at);
    assert_eq!(result.metadata.as_ref().unwrap()["rows"], 7);

    let status = scheduler.job_status("report").unwrap();
    assert_eq!(status.last_result, Some(result));
    assert!(status.last_run.is_some());
}

#[tokio::test]
async fn test_failed_execution_swallowed_by_default() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    scheduler.schedule_job(failing_job("flaky"));

    let result = scheduler.run_job_now("flaky").await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("database unavailable"));

    let status = scheduler.job_status("flaky").unwrap();
    assert_eq!(status.run_count, 1);
    assert_eq!(status.error_count, 1);
}

#[tokio::test]
async fn test_failed_execution_propagates_without_catch() {
    let config = SchedulerConfig {
        catch_errors: false,
        ..SchedulerConfig::default()
    };
    let scheduler = scheduler_with(config);
    scheduler.schedule_job(failing_job("flaky"));

    let err = scheduler.run_job_now("flaky").await.unwrap_err();
    assert!(matches!(err, SchedulerError::JobFailed { ref job, .. } if job == "flaky"));

    // Counters are recorded before the error is surfaced.
    let status = scheduler.job_status("flaky").unwrap();
    assert_eq!(status.run_count, 1);
    assert_eq!(status.error_count, 1);
    assert!(!status.last_result.unwrap().success);
}

#[tokio::test]
async fn test_run_all_without_catch_drops_failures() {
    let config = SchedulerConfig {
        catch_errors: false,
        ..SchedulerConfig::default()
    };
    let scheduler = scheduler_with(config);
    scheduler.schedule_job(failing_job("bad"));
    scheduler.schedule_job(counting_job(
        "good",
        schedules::EVERY_HOUR,
        Arc::new(AtomicU32::new(0)),
    ));

    let results = scheduler.run_all_now().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].job_name, "good");
}

#[tokio::test]
async fn test_unschedule_job() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    scheduler.schedule_job(failing_job("gone"));

    assert!(scheduler.unschedule_job("gone"));
    assert!(scheduler.job_status("gone").is_none());
    assert!(!scheduler.unschedule_job("gone"));

    // The name is free again.
    assert!(scheduler.schedule_job(failing_job("gone")));
}

#[tokio::test]
async fn test_pause_and_resume_unknown_job() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    assert!(!scheduler.pause_job("missing"));
    assert!(!scheduler.resume_job("missing"));
}

#[tokio::test]
async fn test_paused_job_has_no_next_run() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    scheduler.schedule_job(failing_job("nightly"));

    assert!(scheduler.pause_job("nightly"));
    let status = scheduler.job_status("nightly").unwrap();
    assert!(status.paused);
    assert!(status.next_run.is_none());

    assert!(scheduler.resume_job("nightly"));
    let status = scheduler.job_status("nightly").unwrap();
    assert!(!status.paused);
    assert!(status.next_run.is_some());

    // Resuming an active job is harmless.
    assert!(scheduler.resume_job("nightly"));
}

#[tokio::test]
async fn test_paused_job_can_still_run_on_demand() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    let counter = Arc::new(AtomicU32::new(0));
    scheduler.schedule_job(counting_job("manual", schedules::EVERY_HOUR, counter.clone()));
    scheduler.pause_job("manual");

    let result = scheduler.run_job_now("manual").await.unwrap();
    assert!(result.success);
    assert_eq!(counter.load(AtomicOrdering::SeqCst), 1);
}

#[tokio::test]
async fn test_trigger_drives_execution() {
    let scheduler = scheduler_with(SchedulerConfig::default());
    let counter = Arc::new(AtomicU32::new(0));
    scheduler.schedule_job(counting_job(
        "ticker",
        &schedules::every_seconds(1),
        counter.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.unschedule_job("ticker");

    assert!(counter.load(AtomicOrdering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_stop_discards_in_flight_result() {
    let registry = Arc::new(JobRegistry::new());
    let (release_tx, release_rx) = tokio::sync::watch::channel(false);
    registry.register(JobDefinition::new("slow", schedules::EVERY_HOUR, move || {
        let mut release = release_rx.clone();
        async move {
            let _ = release.wait_for(|released| *released).await;
            Ok(None)
        }
    }));

    let scheduler = CronScheduler::new(registry, SchedulerConfig::default());
    scheduler.start().await;

    let runner = scheduler.clone();
    let handle = tokio::spawn(async move { runner.run_job_now("slow").await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    scheduler.stop();
    release_tx.send(true).unwrap();

    let result = handle.await.unwrap().unwrap();
    assert!(result.success);
    assert_eq!(scheduler.get_status().total_jobs, 0);
}
