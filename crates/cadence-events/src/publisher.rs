//! Event publisher.

use std::sync::Arc;
use std::time::Duration;

use cadence_config::PublisherConfig;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::broker::{HistoryLog, MessageChannel};
use crate::error::{BrokerResult, EventError, EventResult};
use crate::event::{BatchEvent, Event, EventMetadata, EventStats, PublishOptions};

/// Default number of entries returned by [`EventPublisher::get_event_history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Pub/sub channel an event is delivered on.
pub fn channel_name(topic: &str, event_type: &str) -> String {
    format!("{}:{}", topic, event_type)
}

/// List key holding a topic's event history.
pub fn history_key(topic: &str) -> String {
    format!("event:history:{}", topic)
}

/// Publishes events with bounded linear-backoff retries and keeps a capped,
/// expiring history per topic.
///
/// Delivery failures are retried and, once exhausted, returned to the
/// caller. History failures are only ever logged.
pub struct EventPublisher {
    channel: Arc<dyn MessageChannel>,
    history: Arc<dyn HistoryLog>,
    config: PublisherConfig,
}

impl EventPublisher {
    /// Create a publisher over separate channel and history collaborators.
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        history: Arc<dyn HistoryLog>,
        config: PublisherConfig,
    ) -> Self {
        Self {
            channel,
            history,
            config,
        }
    }

    /// Create a publisher over a broker that provides both collaborators.
    pub fn from_broker<B>(broker: Arc<B>, config: PublisherConfig) -> Self
    where
        B: MessageChannel + HistoryLog + 'static,
    {
        Self::new(broker.clone(), broker, config)
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Options carrying the configured retry policy.
    pub fn default_options(&self) -> PublishOptions {
        PublishOptions::from_config(&self.config)
    }

    /// Publish an event with the configured retry policy.
    pub async fn publish<T>(
        &self,
        topic: &str,
        event_type: &str,
        payload: T,
    ) -> EventResult<EventMetadata>
    where
        T: Serialize + Send,
    {
        self.publish_with(topic, event_type, payload, self.default_options())
            .await
    }

    /// Publish an event.
    ///
    /// Makes up to `options.retries + 1` delivery attempts of the same event
    /// (same `event_id`), sleeping `retry_delay_ms * attempt` after each
    /// failed attempt. The event is appended to the topic history once,
    /// after the successful attempt.
    ///
    /// # Errors
    ///
    /// [`EventError::PublishFailed`] when every attempt failed.
    pub async fn publish_with<T>(
        &self,
        topic: &str,
        event_type: &str,
        payload: T,
        options: PublishOptions,
    ) -> EventResult<EventMetadata>
    where
        T: Serialize + Send,
    {
        let event = Event {
            metadata: EventMetadata::new(
                event_type,
                &self.config.event_version,
                &self.config.service_name,
                &options,
            ),
            payload,
        };
        let message = serde_json::to_string(&event)?;
        let metadata = event.metadata;

        let channel = channel_name(topic, event_type);
        let attempts = options.retries.saturating_add(1);

        for attempt in 1..=attempts {
            match self.channel.publish(&channel, &message).await {
                Ok(receivers) => {
                    debug!(
                        "Published event {} to {} ({} receivers, attempt {})",
                        metadata.event_id, channel, receivers, attempt
                    );
                    if options.persistent {
                        self.append_history(topic, &message).await;
                    }
                    return Ok(metadata);
                }
                Err(e) if attempt < attempts => {
                    let delay = Duration::from_millis(
                        options.retry_delay_ms.saturating_mul(u64::from(attempt)),
                    );
                    warn!(
                        "Publish attempt {}/{} of event {} to {} failed: {}, retrying in {:?}",
                        attempt, attempts, metadata.event_id, channel, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        "Failed to publish event {} to {} after {} attempts: {}",
                        metadata.event_id, channel, attempts, e
                    );
                }
            }
        }

        Err(EventError::PublishFailed {
            topic: topic.to_string(),
            event_type: event_type.to_string(),
        })
    }

    /// Publish several events to one topic concurrently.
    ///
    /// # Errors
    ///
    /// The first failure fails the whole batch; no per-item report is
    /// returned.
    pub async fn publish_batch<T>(
        &self,
        topic: &str,
        events: Vec<BatchEvent<T>>,
    ) -> EventResult<Vec<EventMetadata>>
    where
        T: Serialize + Send,
    {
        let publishes = events.into_iter().map(|event| async move {
            let options = event.options.unwrap_or_else(|| self.default_options());
            self.publish_with(topic, &event.event_type, event.payload, options)
                .await
        });

        try_join_all(publishes).await
    }

    /// Up to `limit` most recent events of a topic, newest first.
    pub async fn get_event_history(&self, topic: &str, limit: usize) -> Vec<Event<Value>> {
        if limit == 0 {
            return Vec::new();
        }

        let key = history_key(topic);
        let stop = i64::try_from(limit).unwrap_or(i64::MAX) - 1;
        let entries = match self.history.range(&key, 0, stop).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read event history for topic '{}': {}", topic, e);
                return Vec::new();
            }
        };

        entries
            .iter()
            .filter_map(|entry| match serde_json::from_str(entry) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Skipping malformed history entry for topic '{}': {}", topic, e);
                    None
                }
            })
            .collect()
    }

    /// Delete a topic's history.
    pub async fn clear_event_history(&self, topic: &str) {
        match self.history.delete(&history_key(topic)).await {
            Ok(existed) => debug!("Cleared event history for topic '{}' ({})", topic, existed),
            Err(e) => warn!("Failed to clear event history for topic '{}': {}", topic, e),
        }
    }

    /// Size and time span of a topic's history.
    pub async fn get_event_stats(&self, topic: &str) -> EventStats {
        match self.read_stats(&history_key(topic)).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Failed to read event stats for topic '{}': {}", topic, e);
                EventStats::default()
            }
        }
    }

    async fn read_stats(&self, key: &str) -> BrokerResult<EventStats> {
        let total_events = self.history.len(key).await?;
        if total_events == 0 {
            return Ok(EventStats::default());
        }

        let newest = self.history.index(key, 0).await?;
        let oldest = self.history.index(key, -1).await?;

        Ok(EventStats {
            total_events,
            oldest_event_timestamp: oldest.as_deref().and_then(entry_timestamp),
            newest_event_timestamp: newest.as_deref().and_then(entry_timestamp),
        })
    }

    async fn append_history(&self, topic: &str, message: &str) {
        if let Err(e) = self.write_history(&history_key(topic), message).await {
            warn!("Failed to record event history for topic '{}': {}", topic, e);
        }
    }

    async fn write_history(&self, key: &str, message: &str) -> BrokerResult<()> {
        let max_len = i64::try_from(self.config.history_max_len).unwrap_or(i64::MAX);
        let ttl = Duration::from_secs(self.config.history_ttl_secs);

        self.history.push(key, message.to_string()).await?;
        self.history.trim(key, 0, max_len - 1).await?;
        self.history.expire(key, ttl).await?;
        Ok(())
    }
}

fn entry_timestamp(entry: &str) -> Option<DateTime<Utc>> {
    serde_json::from_str::<Event<Value>>(entry)
        .ok()
        .map(|event| event.metadata.timestamp)
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
