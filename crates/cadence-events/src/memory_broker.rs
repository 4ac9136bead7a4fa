//! In-process broker.
//!
//! Channels are `tokio::sync::broadcast` senders created on first use;
//! lists are plain deques that expire lazily when touched after their TTL.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::trace;

use crate::broker::{HistoryLog, MessageChannel};
use crate::error::BrokerResult;

const CHANNEL_CAPACITY: usize = 1024;

struct StoredList {
    items: VecDeque<String>,
    expires_at: Option<Instant>,
}

impl StoredList {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory [`MessageChannel`] and [`HistoryLog`].
pub struct MemoryBroker {
    channels: DashMap<String, broadcast::Sender<String>>,
    lists: Mutex<HashMap<String, StoredList>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            lists: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to a channel. Only messages published afterwards are seen.
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Run `f` against a live (non-expired) list, dropping it first if its
    /// TTL has passed.
    fn with_list<R>(&self, key: &str, f: impl FnOnce(Option<&mut StoredList>) -> R) -> R {
        let mut lists = self.lists.lock();
        if lists.get(key).is_some_and(|list| list.is_expired(Instant::now())) {
            trace!("History key '{}' expired", key);
            lists.remove(key);
        }
        f(lists.get_mut(key))
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve an inclusive Redis-style range against a list length.
fn resolve_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    if len == 0 {
        return None;
    }
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

#[async_trait]
impl MessageChannel for MemoryBroker {
    async fn publish(&self, channel: &str, message: &str) -> BrokerResult<usize> {
        let Some(sender) = self.channels.get(channel) else {
            return Ok(0);
        };
        // A send error only means nobody is listening.
        Ok(sender.send(message.to_string()).unwrap_or(0))
    }
}

#[async_trait]
impl HistoryLog for MemoryBroker {
    async fn push(&self, key: &str, value: String) -> BrokerResult<usize> {
        let mut lists = self.lists.lock();
        let now = Instant::now();
        let list = lists.entry(key.to_string()).or_insert_with(|| StoredList {
            items: VecDeque::new(),
            expires_at: None,
        });
        if list.is_expired(now) {
            list.items.clear();
            list.expires_at = None;
        }
        list.items.push_front(value);
        Ok(list.items.len())
    }

    async fn trim(&self, key: &str, start: i64, stop: i64) -> BrokerResult<()> {
        let mut lists = self.lists.lock();
        let Some(list) = lists.get_mut(key) else {
            return Ok(());
        };
        match resolve_range(start, stop, list.items.len()) {
            Some((start, stop)) => {
                list.items.truncate(stop + 1);
                list.items.drain(..start);
            }
            None => {
                lists.remove(key);
            }
        }
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> BrokerResult<bool> {
        Ok(self.with_list(key, |list| match list {
            Some(list) => {
                list.expires_at = Some(Instant::now() + ttl);
                true
            }
            None => false,
        }))
    }

    async fn range(&self, key: &str, start: i64, stop: i64) -> BrokerResult<Vec<String>> {
        Ok(self.with_list(key, |list| {
            let Some(list) = list else {
                return Vec::new();
            };
            match resolve_range(start, stop, list.items.len()) {
                Some((start, stop)) => list.items.range(start..=stop).cloned().collect(),
                None => Vec::new(),
            }
        }))
    }

    async fn len(&self, key: &str) -> BrokerResult<usize> {
        Ok(self.with_list(key, |list| list.map_or(0, |list| list.items.len())))
    }

    async fn index(&self, key: &str, index: i64) -> BrokerResult<Option<String>> {
        Ok(self.with_list(key, |list| {
            let list = list?;
            resolve_index(index, list.items.len()).and_then(|i| list.items.get(i).cloned())
        }))
    }

    async fn delete(&self, key: &str) -> BrokerResult<bool> {
        let existed = self.with_list(key, |list| list.is_some());
        self.lists.lock().remove(key);
        Ok(existed)
    }
}

#[cfg(test)]
#[path = "memory_broker_tests.rs"]
mod tests;
