//! Short-lived buffers that bridge the steps of a multi-step input form.
//!
//! Nothing in here is durable. Losing a buffered step only means the user has to repeat it,
//! because nothing reaches the store until the final step succeeds.

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What a form is collecting. Separate purposes never share a buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPurpose {
    /// A participant's first prediction for a round.
    Prediction,
    /// A participant changing an existing prediction.
    Edit,
    /// An administrator entering real results.
    Results,
    /// An administrator entering the fixture titles of a round.
    Fixtures,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user_id: String,
    pub round: u32,
    pub purpose: SessionPurpose,
}

impl SessionKey {
    pub fn new(user_id: &str, round: u32, purpose: SessionPurpose) -> Self {
        Self {
            user_id: user_id.to_string(),
            round,
            purpose,
        }
    }
}

/// Values collected by the completed steps of one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    pub values: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Backing storage for pending form input.
pub trait SessionStorage: Send + Sync {
    fn load(&self, key: &SessionKey) -> Option<PendingInput>;
    fn save(&self, key: SessionKey, input: PendingInput);
    fn remove(&self, key: &SessionKey) -> Option<PendingInput>;
    /// Drop every entry last updated before the cutoff and return how many went.
    fn remove_older_than(&self, cutoff: DateTime<Utc>) -> usize;
}

/// Process-local session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<SessionKey, PendingInput>>,
}

impl MemorySessionStorage {
    fn entries(&self) -> MutexGuard<'_, HashMap<SessionKey, PendingInput>> {
        // entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, key: &SessionKey) -> Option<PendingInput> {
        self.entries().get(key).cloned()
    }

    fn save(&self, key: SessionKey, input: PendingInput) {
        self.entries().insert(key, input);
    }

    fn remove(&self, key: &SessionKey) -> Option<PendingInput> {
        self.entries().remove(key)
    }

    fn remove_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, input| input.updated_at >= cutoff);
        before - entries.len()
    }
}

/// Keeps at most one pending form per key, with optional expiry.
pub struct SessionManager {
    storage: Box<dyn SessionStorage>,
    ttl: Option<TimeDelta>,
}

impl SessionManager {
    /// A manager backed by process-local storage.
    #[must_use]
    pub fn new(ttl: Option<TimeDelta>) -> Self {
        Self::with_storage(Box::new(MemorySessionStorage::default()), ttl)
    }

    #[must_use]
    pub fn with_storage(storage: Box<dyn SessionStorage>, ttl: Option<TimeDelta>) -> Self {
        Self { storage, ttl }
    }

    fn is_expired(&self, input: &PendingInput, now: DateTime<Utc>) -> bool {
        self.ttl.is_some_and(|ttl| now - input.updated_at > ttl)
    }

    /// Begin a form with its first step, replacing anything already pending for the key.
    /// Forms abandoned by anyone past their expiry are swept at the same time.
    pub fn start(&self, key: SessionKey, values: Vec<String>, now: DateTime<Utc>) {
        let evicted = self.evict_expired(now);
        if evicted > 0 {
            debug!("Evicted {evicted} abandoned forms");
        }
        if let Some(replaced) = self.storage.load(&key) {
            debug!(
                "Discarding {} pending values for {key:?}, form restarted",
                replaced.values.len()
            );
        }
        self.storage.save(
            key,
            PendingInput {
                values,
                updated_at: now,
            },
        );
    }

    /// The live pending input for a key. Expired entries are evicted and reported as absent.
    pub fn pending(&self, key: &SessionKey, now: DateTime<Utc>) -> Option<PendingInput> {
        let input = self.storage.load(key)?;
        if self.is_expired(&input, now) {
            warn!("Pending form for {key:?} expired, discarding it");
            self.storage.remove(key);
            return None;
        }
        Some(input)
    }

    /// Replace the values of a pending form, refreshing its timestamp.
    pub fn update(&self, key: SessionKey, values: Vec<String>, now: DateTime<Utc>) {
        self.storage.save(
            key,
            PendingInput {
                values,
                updated_at: now,
            },
        );
    }

    /// Consume a pending form once its final step has been stored.
    pub fn finish(&self, key: &SessionKey) -> Option<PendingInput> {
        self.storage.remove(key)
    }

    /// Evict every expired entry. Does nothing when there is no expiry.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        match self.ttl {
            Some(ttl) => self.storage.remove_older_than(now - ttl),
            None => 0,
        }
    }
}
