//! Broker collaborator seams.
//!
//! The publisher only needs a pub/sub channel and a list store with
//! Redis-like semantics; anything implementing these traits can back it.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrokerResult;

/// Pub/sub primitive.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Publish a message. Returns the number of subscribers that received it.
    async fn publish(&self, channel: &str, message: &str) -> BrokerResult<usize>;
}

/// List-store primitive used for the bounded event history.
///
/// Indices follow Redis list conventions: `0` is the head (most recently
/// pushed) and negative indices count back from the tail (`-1` is the
/// oldest element). Ranges are inclusive on both ends.
#[async_trait]
pub trait HistoryLog: Send + Sync {
    /// Push a value to the head of the list. Returns the new length.
    async fn push(&self, key: &str, value: String) -> BrokerResult<usize>;

    /// Keep only the elements in `[start, stop]`.
    async fn trim(&self, key: &str, start: i64, stop: i64) -> BrokerResult<()>;

    /// Set (or refresh) the time-to-live of a key. Returns whether it exists.
    async fn expire(&self, key: &str, ttl: Duration) -> BrokerResult<bool>;

    /// Elements in `[start, stop]`, head first.
    async fn range(&self, key: &str, start: i64, stop: i64) -> BrokerResult<Vec<String>>;

    /// Number of elements (0 for a missing key).
    async fn len(&self, key: &str) -> BrokerResult<usize>;

    /// Element at `index`, if any.
    async fn index(&self, key: &str, index: i64) -> BrokerResult<Option<String>>;

    /// Delete a key. Returns whether it existed.
    async fn delete(&self, key: &str) -> BrokerResult<bool>;
}
