//! Error types for event publishing.

use thiserror::Error;

/// Errors raised by a broker collaborator.
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    /// The pub/sub channel could not accept the message.
    #[error("Channel unavailable: {0}")]
    Unavailable(String),

    /// The list store rejected an operation.
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors surfaced to callers of the publisher.
#[derive(Debug, Error)]
pub enum EventError {
    /// Every delivery attempt failed.
    #[error("EVENT_PUBLISH_FAILED: could not publish '{event_type}' to topic '{topic}'")]
    PublishFailed { topic: String, event_type: String },

    /// The event could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            EventError::PublishFailed { .. } => "EVENT_PUBLISH_FAILED",
            EventError::Serialization(_) => "EVENT_SERIALIZATION_FAILED",
        }
    }
}

/// Result type for publisher operations.
pub type EventResult<T> = Result<T, EventError>;
