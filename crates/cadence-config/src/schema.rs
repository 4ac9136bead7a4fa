//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub publisher: PublisherConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Jobs registered at startup.
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

/// Cron scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Timezone used for jobs that don't declare their own (IANA name).
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Run every scheduled job once right after `start()`.
    #[serde(default)]
    pub run_on_start: bool,

    /// Swallow handler errors. When false, a failed execution is returned
    /// as an error to the caller that triggered it.
    #[serde(default = "default_true")]
    pub catch_errors: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            run_on_start: false,
            catch_errors: true,
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_true() -> bool {
    true
}

/// Event publisher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Service name stamped into every event's metadata.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Event schema version stamped into every event's metadata.
    #[serde(default = "default_event_version")]
    pub event_version: String,

    /// Extra delivery attempts after the first one.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay between attempts; attempt `n` waits `n * retry_delay_ms`.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Maximum number of history entries kept per topic.
    #[serde(default = "default_history_max_len")]
    pub history_max_len: usize,

    /// History expiry, refreshed on every write.
    #[serde(default = "default_history_ttl_secs")]
    pub history_ttl_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            event_version: default_event_version(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            history_max_len: default_history_max_len(),
            history_ttl_secs: default_history_ttl_secs(),
        }
    }
}

fn default_service_name() -> String {
    "cadence".to_string()
}

fn default_event_version() -> String {
    "1.0".to_string()
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_history_max_len() -> usize {
    1000
}

fn default_history_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files. `None` disables file logging.
    #[serde(default = "default_log_directory")]
    pub directory: Option<PathBuf>,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Number of daily log files to keep.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
            file_prefix: default_file_prefix(),
            max_files: default_max_files(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cadence").join("logs"))
}

fn default_file_prefix() -> String {
    "cadence".to_string()
}

fn default_max_files() -> usize {
    30
}

/// A job declared in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Unique job name.
    pub name: String,

    /// Cron expression (5 or 6 fields).
    pub schedule: String,

    /// Overrides the scheduler timezone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// What the job does when it fires.
    pub action: JobAction,
}

/// Built-in job actions available to configured jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobAction {
    /// Emit a log line.
    Log { message: String },

    /// Publish an event through the event publisher.
    Publish {
        topic: String,
        event_type: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}
