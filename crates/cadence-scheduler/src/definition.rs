//! Job definitions, handlers and execution results.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form metadata a handler may return from a successful run.
pub type JobMetadata = HashMap<String, serde_json::Value>;

/// Outcome of a single handler invocation.
pub type HandlerResult = anyhow::Result<Option<JobMetadata>>;

/// The unit of work a job runs on every trigger.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Run the job once.
    async fn run(&self) -> HandlerResult;
}

/// Adapter turning an async closure into a [`JobHandler`].
pub struct FnJobHandler<F> {
    f: F,
}

impl<F> FnJobHandler<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> JobHandler for FnJobHandler<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn run(&self) -> HandlerResult {
        (self.f)().await
    }
}

/// Stable identity of a scheduled job, independent of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job definition.
///
/// Immutable once registered; the registry and scheduler share it behind
/// an `Arc`.
#[derive(Clone)]
pub struct JobDefinition {
    /// Unique job name.
    pub name: String,
    /// Cron schedule expression (5 or 6 fields).
    pub schedule: String,
    /// IANA timezone; the scheduler default applies when `None`.
    pub timezone: Option<String>,
    /// Whether `start()` picks this job up.
    pub enabled: bool,
    /// Optional description.
    pub description: Option<String>,
    handler: Arc<dyn JobHandler>,
}

impl JobDefinition {
    /// Create a new job definition from an async closure.
    pub fn new<F, Fut>(name: impl Into<String>, schedule: impl Into<String>, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::with_handler(name, schedule, Arc::new(FnJobHandler::new(handler)))
    }

    /// Create a new job definition from an existing handler.
    pub fn with_handler(
        name: impl Into<String>,
        schedule: impl Into<String>,
        handler: Arc<dyn JobHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            schedule: schedule.into(),
            timezone: None,
            enabled: true,
            description: None,
            handler,
        }
    }

    /// Set the timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Add a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The job's handler.
    pub fn handler(&self) -> Arc<dyn JobHandler> {
        self.handler.clone()
    }
}

impl fmt::Debug for JobDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDefinition")
            .field("name", &self.name)
            .field("schedule", &self.schedule)
            .field("timezone", &self.timezone)
            .field("enabled", &self.enabled)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Result of one job execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobExecutionResult {
    pub job_name: String,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JobMetadata>,
}

impl JobExecutionResult {
    /// Result for an execution request against a job that isn't scheduled.
    pub fn not_scheduled(job_name: impl Into<String>) -> Self {
        let job_name = job_name.into();
        let now = Utc::now();
        Self {
            error: Some(format!("Job '{}' is not scheduled", job_name)),
            job_name,
            success: false,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            metadata: None,
        }
    }
}
