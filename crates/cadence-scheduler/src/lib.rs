//! # Cadence Scheduler
//!
//! Time-triggered execution of named jobs.
//!
//! ## Key Components
//!
//! - [`JobRegistry`]: catalog of [`JobDefinition`]s keyed by unique name
//! - [`CronScheduler`]: turns registered definitions into live cron triggers
//!   and keeps per-job run/error counters and the last execution result
//! - [`CronTrigger`] / [`CronSchedule`]: the cron evaluation collaborator
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cadence_config::SchedulerConfig;
//! use cadence_scheduler::{CronScheduler, JobDefinition, JobRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(JobRegistry::new());
//!     registry.register(JobDefinition::new("cleanup", "*/15 * * * *", || async {
//!         // do the work
//!         Ok(None)
//!     }));
//!
//!     let scheduler = CronScheduler::new(registry, SchedulerConfig::default());
//!     scheduler.start().await;
//!     // ...
//!     scheduler.stop();
//! }
//! ```

pub mod definition;
pub mod error;
pub mod registry;
pub mod scheduler;
mod scheduler_execution;
pub mod status;
pub mod trigger;

pub use definition::{
    FnJobHandler, HandlerResult, JobDefinition, JobExecutionResult, JobHandler, JobId, JobMetadata,
};
pub use error::{SchedulerError, SchedulerResult};
pub use registry::JobRegistry;
pub use scheduler::CronScheduler;
pub use status::{JobStatus, SchedulerStatus};
pub use trigger::{
    CronSchedule, CronTrigger, TriggerCallback, normalize_cron, parse_timezone, schedules,
    validate_cron,
};
