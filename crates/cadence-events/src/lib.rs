//! # Cadence Events
//!
//! At-least-once publishing of typed application events.
//!
//! Every event goes to the pub/sub channel `"<topic>:<event_type>"`; after a
//! successful delivery it is also appended to the topic's history log
//! (`"event:history:<topic>"`), which is capped and expires unless written
//! to again.
//!
//! ## Key Components
//!
//! - [`EventPublisher`]: publish with linear-backoff retries, batch publish,
//!   history and statistics queries
//! - [`MessageChannel`] / [`HistoryLog`]: the broker collaborator seams
//! - [`MemoryBroker`]: in-process implementation of both
//! - [`domain`]: fixed-shape helpers for user and product events

pub mod broker;
pub mod domain;
pub mod error;
pub mod event;
pub mod memory_broker;
pub mod publisher;

pub use broker::{HistoryLog, MessageChannel};
pub use domain::DOMAIN_EVENTS_TOPIC;
pub use error::{BrokerError, BrokerResult, EventError, EventResult};
pub use event::{BatchEvent, Event, EventMetadata, EventStats, PublishOptions};
pub use memory_broker::MemoryBroker;
pub use publisher::{DEFAULT_HISTORY_LIMIT, EventPublisher, channel_name, history_key};
