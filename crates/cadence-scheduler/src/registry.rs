//! Job registry.
//!
//! Pure bookkeeping: holds named [`JobDefinition`]s and never executes
//! anything. A [`CronScheduler`](crate::CronScheduler) reads it when it
//! starts.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::definition::JobDefinition;

/// Thread-safe catalog of job definitions keyed by unique name.
///
/// All operations are total: registering an existing name overwrites it
/// (last writer wins) and removing an unknown name reports `false`.
pub struct JobRegistry {
    jobs: DashMap<String, Arc<JobDefinition>>,
}

impl JobRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    /// Register a job, replacing any previous definition with the same name.
    pub fn register(&self, job: impl Into<Arc<JobDefinition>>) {
        let job = job.into();
        let name = job.name.clone();

        if self.jobs.insert(name.clone(), job).is_some() {
            warn!("Job '{}' is already registered, overwriting", name);
        } else {
            debug!("Registered job '{}'", name);
        }
    }

    /// Remove a job by name. Returns whether it existed.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.jobs.remove(name).is_some();
        if removed {
            debug!("Unregistered job '{}'", name);
        }
        removed
    }

    /// Get a job by name.
    pub fn get(&self, name: &str) -> Option<Arc<JobDefinition>> {
        self.jobs.get(name).map(|job| job.clone())
    }

    /// All registered jobs, ordered by name.
    pub fn get_all(&self) -> Vec<Arc<JobDefinition>> {
        let mut jobs: Vec<_> = self.jobs.iter().map(|entry| entry.value().clone()).collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        jobs
    }

    /// Check if a job with the given name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// Get the number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Remove every job. Schedulers keep the jobs they already scheduled.
    pub fn clear(&self) {
        self.jobs.clear();
        debug!("Job registry cleared");
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
