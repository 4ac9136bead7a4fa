//! Event envelope types.

use cadence_config::PublisherConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata stamped on every published event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// `<unix-millis>-<random>`; shared by every retry of one publish.
    pub event_id: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    /// Name of the publishing service.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl EventMetadata {
    pub(crate) fn new(
        event_type: impl Into<String>,
        version: impl Into<String>,
        source: impl Into<String>,
        options: &PublishOptions,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            event_id: generate_event_id(timestamp),
            event_type: event_type.into(),
            timestamp,
            version: version.into(),
            source: source.into(),
            correlation_id: options.correlation_id.clone(),
            causation_id: options.causation_id.clone(),
            user_id: options.user_id.clone(),
        }
    }
}

fn generate_event_id(timestamp: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", timestamp.timestamp_millis(), &random[..9])
}

/// A published event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<T> {
    pub metadata: EventMetadata,
    pub payload: T,
}

/// Per-publish delivery options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Extra attempts after the first one.
    pub retries: u32,
    /// Attempt `n` is followed by a `n * retry_delay_ms` pause.
    pub retry_delay_ms: u64,
    /// Record the event in the topic history after delivery.
    pub persistent: bool,
    pub correlation_id: Option<String>,
    pub causation_id: Option<String>,
    pub user_id: Option<String>,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 1000,
            persistent: true,
            correlation_id: None,
            causation_id: None,
            user_id: None,
        }
    }
}

impl PublishOptions {
    /// Options using the configured retry policy.
    pub fn from_config(config: &PublisherConfig) -> Self {
        Self {
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
            ..Self::default()
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_causation_id(mut self, causation_id: impl Into<String>) -> Self {
        self.causation_id = Some(causation_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// One item of a batch publish.
#[derive(Debug, Clone)]
pub struct BatchEvent<T> {
    pub event_type: String,
    pub payload: T,
    /// Publisher defaults apply when `None`.
    pub options: Option<PublishOptions>,
}

impl<T> BatchEvent<T> {
    pub fn new(event_type: impl Into<String>, payload: T) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            options: None,
        }
    }

    pub fn with_options(mut self, options: PublishOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Summary of a topic's history log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStats {
    pub total_events: usize,
    pub oldest_event_timestamp: Option<DateTime<Utc>>,
    pub newest_event_timestamp: Option<DateTime<Utc>>,
}
