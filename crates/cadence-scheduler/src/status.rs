//! Read-only scheduler snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::definition::{JobExecutionResult, JobId};

/// Snapshot of one scheduled job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: JobId,
    pub name: String,
    pub schedule: String,
    pub timezone: Option<String>,
    pub enabled: bool,
    pub paused: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub last_result: Option<JobExecutionResult>,
    pub run_count: u64,
    pub error_count: u64,
    /// Next trigger time; `None` while paused.
    pub next_run: Option<DateTime<Utc>>,
}

/// Snapshot of the whole scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub is_running: bool,
    pub total_jobs: usize,
    pub jobs: Vec<JobStatus>,
}

impl SchedulerStatus {
    /// Find a job snapshot by name.
    pub fn job(&self, name: &str) -> Option<&JobStatus> {
        self.jobs.iter().find(|job| job.name == name)
    }
}
