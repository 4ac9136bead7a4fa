//! Error types for the scheduler.

use thiserror::Error;

/// Errors that can occur while scheduling or executing jobs.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The cron expression could not be parsed.
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    /// The timezone is not a known IANA name.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A job handler failed and the scheduler is configured not to swallow it.
    #[error("Job '{job}' failed: {message}")]
    JobFailed { job: String, message: String },
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
