//! Job execution: the only code path that touches run/error counters.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::definition::JobExecutionResult;
use crate::error::{SchedulerError, SchedulerResult};
use crate::scheduler::{ActiveJob, CronScheduler, SchedulerInner};

impl CronScheduler {
    /// Run a job once, outside its cron cadence.
    ///
    /// Counters and last result are updated exactly as for a triggered run.
    /// An unscheduled name yields a failed result without touching any
    /// counters.
    ///
    /// # Errors
    ///
    /// Only when `catch_errors` is disabled and the handler fails.
    pub async fn run_job_now(&self, name: &str) -> SchedulerResult<JobExecutionResult> {
        info!("Running job '{}' on demand", name);
        self.inner.execute_job(name).await
    }

    /// Run every scheduled job once, concurrently.
    ///
    /// Failures are logged per job and never propagate; the returned list
    /// holds the results that were produced.
    pub async fn run_all_now(&self) -> Vec<JobExecutionResult> {
        let names: Vec<String> = self.inner.jobs.read().by_name.keys().cloned().collect();

        let outcomes = join_all(names.iter().map(|name| self.inner.execute_job(name))).await;

        names
            .into_iter()
            .zip(outcomes)
            .filter_map(|(name, outcome)| match outcome {
                Ok(result) => Some(result),
                Err(e) => {
                    error!("Job '{}' failed during run-all: {}", name, e);
                    None
                }
            })
            .collect()
    }
}

impl SchedulerInner {
    pub(crate) async fn execute_job(&self, name: &str) -> SchedulerResult<JobExecutionResult> {
        let Some(job) = self.active_job(name) else {
            warn!("Job '{}' is not scheduled, nothing to execute", name);
            return Ok(JobExecutionResult::not_scheduled(name));
        };

        let started_at = Utc::now();
        debug!("Executing job '{}'", name);

        let outcome = job.definition.handler().run().await;

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        let result = match outcome {
            Ok(metadata) => JobExecutionResult {
                job_name: name.to_string(),
                success: true,
                started_at,
                finished_at,
                duration_ms,
                error: None,
                metadata,
            },
            Err(e) => JobExecutionResult {
                job_name: name.to_string(),
                success: false,
                started_at,
                finished_at,
                duration_ms,
                error: Some(e.to_string()),
                metadata: None,
            },
        };

        job.record(&result);

        if !self.is_tracked(&job) {
            debug!(
                "Job '{}' finished after being unscheduled, result discarded",
                name
            );
        }

        match &result.error {
            None => {
                info!("Job '{}' completed in {}ms", name, duration_ms);
                Ok(result)
            }
            Some(message) if self.config.catch_errors => {
                warn!("Job '{}' failed after {}ms: {}", name, duration_ms, message);
                Ok(result)
            }
            Some(message) => Err(SchedulerError::JobFailed {
                job: name.to_string(),
                message: message.clone(),
            }),
        }
    }

    fn is_tracked(&self, job: &Arc<ActiveJob>) -> bool {
        self.jobs
            .read()
            .entries
            .get(&job.id)
            .is_some_and(|current| Arc::ptr_eq(current, job))
    }
}

impl ActiveJob {
    fn record(&self, result: &JobExecutionResult) {
        let mut state = self.state.lock();
        state.run_count += 1;
        if !result.success {
            state.error_count += 1;
        }
        state.last_run = Some(result.started_at);
        state.last_result = Some(result.clone());
    }
}
