//! In-memory capsule store keyed by user id.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Outcome of [`CapsuleStore::take_if_ready`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Take {
    /// The user has no capsule.
    Missing,
    /// The capsule exists but the release date has not passed yet.
    Pending(Duration),
    /// The capsule was released and removed from the store.
    Ready(String),
}

/// Holds at most one capsule per user.
///
/// Nothing is persisted and nothing is evicted; a capsule leaves the store
/// only when it is delivered.
#[derive(Debug, Default)]
pub struct CapsuleStore {
    capsules: HashMap<i64, String>,
}

impl CapsuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a capsule, replacing any capsule the user already had.
    pub fn put(&mut self, user_id: i64, text: impl Into<String>) {
        let replaced = self.capsules.insert(user_id, text.into()).is_some();
        debug!(user_id, replaced, "capsule stored");
    }

    /// Look up a capsule without removing it.
    pub fn get(&self, user_id: i64) -> Option<&str> {
        self.capsules.get(&user_id).map(String::as_str)
    }

    /// Remove and return the capsule if `now` has reached `release`.
    ///
    /// Before the release date the capsule stays in place and the remaining
    /// time is reported instead.
    pub fn take_if_ready(&mut self, user_id: i64, now: DateTime<Utc>, release: DateTime<Utc>) -> Take {
        if !self.capsules.contains_key(&user_id) {
            return Take::Missing;
        }

        if now < release {
            return Take::Pending(release - now);
        }

        match self.capsules.remove(&user_id) {
            Some(text) => {
                debug!(user_id, "capsule released");
                Take::Ready(text)
            }
            None => Take::Missing,
        }
    }

    /// Put a capsule back after a failed delivery.
    ///
    /// Does nothing if the user stored a newer capsule in the meantime.
    /// Returns whether the capsule was restored.
    pub fn restore(&mut self, user_id: i64, text: impl Into<String>) -> bool {
        if self.capsules.contains_key(&user_id) {
            return false;
        }
        self.capsules.insert(user_id, text.into());
        debug!(user_id, "capsule restored after failed delivery");
        true
    }

    /// User ids that currently hold a capsule, in ascending order.
    pub fn user_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.capsules.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of stored capsules.
    pub fn len(&self) -> usize {
        self.capsules.len()
    }

    /// Whether the store holds no capsules.
    pub fn is_empty(&self) -> bool {
        self.capsules.is_empty()
    }
}
