//! Cron scheduler.
//!
//! Turns registered [`JobDefinition`]s into live [`CronTrigger`]s and keeps
//! per-job bookkeeping (run/error counters, last result). Scheduled jobs
//! live in an arena keyed by [`JobId`] with a name index on the side;
//! names are the unique scheduling key.
//!
//! Execution itself (and therefore every counter update) lives in
//! `scheduler_execution.rs`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cadence_config::SchedulerConfig;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::definition::{JobDefinition, JobExecutionResult, JobId};
use crate::error::SchedulerResult;
use crate::registry::JobRegistry;
use crate::status::{JobStatus, SchedulerStatus};
use crate::trigger::{CronSchedule, CronTrigger, TriggerCallback};

/// Cron scheduler bound to a [`JobRegistry`].
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct CronScheduler {
    pub(crate) inner: Arc<SchedulerInner>,
}

pub(crate) struct SchedulerInner {
    pub(crate) registry: Arc<JobRegistry>,
    pub(crate) config: SchedulerConfig,
    pub(crate) running: AtomicBool,
    pub(crate) jobs: RwLock<ActiveJobs>,
}

#[derive(Default)]
pub(crate) struct ActiveJobs {
    pub(crate) entries: HashMap<JobId, Arc<ActiveJob>>,
    pub(crate) by_name: HashMap<String, JobId>,
}

impl ActiveJobs {
    pub(crate) fn get(&self, name: &str) -> Option<Arc<ActiveJob>> {
        self.by_name
            .get(name)
            .and_then(|id| self.entries.get(id))
            .cloned()
    }
}

/// Live bookkeeping for one scheduled job.
pub(crate) struct ActiveJob {
    pub(crate) id: JobId,
    pub(crate) definition: Arc<JobDefinition>,
    pub(crate) schedule: Arc<CronSchedule>,
    /// `None` while paused.
    pub(crate) trigger: Mutex<Option<CronTrigger>>,
    pub(crate) state: Mutex<ExecutionState>,
}

#[derive(Debug, Default)]
pub(crate) struct ExecutionState {
    pub(crate) last_run: Option<DateTime<Utc>>,
    pub(crate) last_result: Option<JobExecutionResult>,
    pub(crate) run_count: u64,
    pub(crate) error_count: u64,
}

impl ActiveJob {
    fn status(&self) -> JobStatus {
        let trigger = self.trigger.lock();
        let state = self.state.lock();
        JobStatus {
            id: self.id,
            name: self.definition.name.clone(),
            schedule: self.definition.schedule.clone(),
            timezone: self.definition.timezone.clone(),
            enabled: self.definition.enabled,
            paused: trigger.is_none(),
            last_run: state.last_run,
            last_result: state.last_result.clone(),
            run_count: state.run_count,
            error_count: state.error_count,
            next_run: trigger.as_ref().and_then(|t| t.next_fire_time()),
        }
    }

    fn cancel_trigger(&self) {
        if let Some(trigger) = self.trigger.lock().take() {
            trigger.cancel();
        }
    }
}

impl CronScheduler {
    /// Create a scheduler. Nothing is scheduled until [`start`](Self::start).
    pub fn new(registry: Arc<JobRegistry>, config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                registry,
                config,
                running: AtomicBool::new(false),
                jobs: RwLock::new(ActiveJobs::default()),
            }),
        }
    }

    /// The registry this scheduler reads on start.
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.inner.registry
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Schedule every enabled job currently in the registry.
    ///
    /// Idempotent: a second call while running only logs a warning. With
    /// `run_on_start`, every scheduled job also runs once immediately; a
    /// failing job never prevents the others from running.
    pub async fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            warn!("Cron scheduler is already running");
            return;
        }

        let mut scheduled = 0;
        for job in self.inner.registry.get_all() {
            if !job.enabled {
                debug!("Skipping disabled job '{}'", job.name);
                continue;
            }
            if self.schedule_job(job) {
                scheduled += 1;
            }
        }

        info!("Cron scheduler started with {} job(s)", scheduled);

        if self.inner.config.run_on_start {
            info!("Running all scheduled jobs on start");
            self.run_all_now().await;
        }
    }

    /// Cancel every trigger and drop all job bookkeeping.
    ///
    /// Executions already in flight run to completion; their results are
    /// not recorded anywhere.
    pub fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            warn!("Cron scheduler is not running");
            return;
        }

        let jobs = std::mem::take(&mut *self.inner.jobs.write());
        for job in jobs.entries.values() {
            job.cancel_trigger();
        }

        info!(
            "Cron scheduler stopped, {} job(s) unscheduled",
            jobs.entries.len()
        );
    }

    /// Schedule a single job.
    ///
    /// Returns `false` without side effects if a job with the same name is
    /// already scheduled, or if its cron expression or timezone is invalid
    /// (logged as an error).
    pub fn schedule_job(&self, job: impl Into<Arc<JobDefinition>>) -> bool {
        let definition = job.into();
        let name = definition.name.clone();

        if self.inner.jobs.read().by_name.contains_key(&name) {
            warn!("Job '{}' is already scheduled", name);
            return false;
        }

        let timezone = definition
            .timezone
            .as_deref()
            .unwrap_or(&self.inner.config.timezone);
        let schedule = match CronSchedule::parse(&definition.schedule, timezone) {
            Ok(schedule) => Arc::new(schedule),
            Err(e) => {
                error!("Cannot schedule job '{}': {}", name, e);
                return false;
            }
        };

        let active = Arc::new(ActiveJob {
            id: JobId::new(),
            definition,
            schedule,
            trigger: Mutex::new(None),
            state: Mutex::new(ExecutionState::default()),
        });

        {
            let mut jobs = self.inner.jobs.write();
            if jobs.by_name.contains_key(&name) {
                warn!("Job '{}' is already scheduled", name);
                return false;
            }
            jobs.by_name.insert(name.clone(), active.id);
            jobs.entries.insert(active.id, active.clone());
        }

        *active.trigger.lock() = Some(self.start_trigger(&active));

        info!(
            "Scheduled job '{}' ({} {})",
            name,
            active.schedule.expression(),
            active.schedule.timezone()
        );
        true
    }

    /// Remove a job's trigger and bookkeeping.
    pub fn unschedule_job(&self, name: &str) -> bool {
        let removed = {
            let mut jobs = self.inner.jobs.write();
            jobs.by_name
                .remove(name)
                .and_then(|id| jobs.entries.remove(&id))
        };

        match removed {
            Some(job) => {
                job.cancel_trigger();
                info!("Unscheduled job '{}'", name);
                true
            }
            None => {
                warn!("Cannot unschedule job '{}': not scheduled", name);
                false
            }
        }
    }

    /// Stop a job's trigger, keeping its counters and last result.
    pub fn pause_job(&self, name: &str) -> bool {
        let Some(job) = self.inner.active_job(name) else {
            warn!("Cannot pause job '{}': not scheduled", name);
            return false;
        };

        job.cancel_trigger();
        info!("Paused job '{}'", name);
        true
    }

    /// Restart a paused job's trigger.
    pub fn resume_job(&self, name: &str) -> bool {
        let Some(job) = self.inner.active_job(name) else {
            warn!("Cannot resume job '{}': not scheduled", name);
            return false;
        };

        let mut trigger = job.trigger.lock();
        if trigger.is_some() {
            debug!("Job '{}' is not paused", name);
            return true;
        }
        *trigger = Some(self.start_trigger(&job));
        info!("Resumed job '{}'", name);
        true
    }

    /// Snapshot of the scheduler and every scheduled job, ordered by name.
    pub fn get_status(&self) -> SchedulerStatus {
        let mut jobs: Vec<JobStatus> = self
            .inner
            .jobs
            .read()
            .entries
            .values()
            .map(|job| job.status())
            .collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));

        SchedulerStatus {
            is_running: self.is_running(),
            total_jobs: jobs.len(),
            jobs,
        }
    }

    /// Snapshot of a single scheduled job.
    pub fn job_status(&self, name: &str) -> Option<JobStatus> {
        self.inner.active_job(name).map(|job| job.status())
    }

    /// Upcoming fire times of an expression, evaluated in `timezone`.
    pub fn next_runs(
        expression: &str,
        timezone: &str,
        count: usize,
    ) -> SchedulerResult<Vec<DateTime<Utc>>> {
        Ok(CronSchedule::parse(expression, timezone)?.upcoming(count))
    }

    fn start_trigger(&self, job: &ActiveJob) -> CronTrigger {
        let weak = Arc::downgrade(&self.inner);
        let name = job.definition.name.clone();

        let callback: TriggerCallback = Arc::new(move || {
            let weak = weak.clone();
            let name = name.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Err(e) = inner.execute_job(&name).await {
                    error!("Scheduled run of job '{}' failed: {}", name, e);
                }
            }
            .boxed()
        });

        CronTrigger::start(job.id.to_string(), job.schedule.clone(), callback)
    }
}

impl SchedulerInner {
    pub(crate) fn active_job(&self, name: &str) -> Option<Arc<ActiveJob>> {
        self.jobs.read().get(name)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
