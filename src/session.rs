//! Per-conversation translation cache
//!
//! Holds the most recent translation of each conversation so a later
//! postback can be resolved against it. Every write gets a fresh version
//! number; postback tokens carry the version they were built from, which
//! makes a postback racing a newer message detectable. Versions start from
//! a random offset so buttons sent before a restart never match.

use crate::translation::TranslationResult;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Identity of a conversation (one user, group, or room)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationKey(String);

impl ConversationKey {
    pub fn user(id: &str) -> Self {
        Self(format!("user:{id}"))
    }

    pub fn group(id: &str) -> Self {
        Self(format!("group:{id}"))
    }

    pub fn room(id: &str) -> Self {
        Self(format!("room:{id}"))
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached translation and the version it was stored under
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTranslation {
    pub version: u64,
    pub result: TranslationResult,
    stored_at: Instant,
}

/// Concurrent keyed store, last write wins
pub struct SessionStore {
    entries: RwLock<HashMap<ConversationKey, StoredTranslation>>,
    next_version: AtomicU64,
    /// `None` keeps entries forever
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_version: AtomicU64::new(initial_version()),
            ttl,
        }
    }

    /// Store without expiry
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Overwrite the conversation's result, returning its new version
    pub async fn put(&self, key: ConversationKey, result: TranslationResult) -> u64 {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let entry = StoredTranslation {
            version,
            result,
            stored_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
        version
    }

    /// The conversation's current result, if any and not expired
    pub async fn get(&self, key: &ConversationKey) -> Option<StoredTranslation> {
        {
            let entries = self.entries.read().await;
            let entry = entries.get(key)?;
            if !self.is_expired(entry) {
                return Some(entry.clone());
            }
        }

        // Expired: drop it unless a writer replaced it in between
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| self.is_expired(e)) {
            entries.remove(key);
            tracing::debug!(conversation = %key, "Evicted expired session");
        }
        entries.get(key).cloned()
    }

    /// Remove every expired entry, returning how many were dropped
    pub async fn evict_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn is_expired(&self, entry: &StoredTranslation) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() > ttl)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Random starting version, leaving headroom below `u64::MAX`
fn initial_version() -> u64 {
    let (_, low) = Uuid::new_v4().as_u64_pair();
    (low >> 2) + 1
}

/// Periodically evict expired sessions until `cancel` fires
pub fn spawn_evictor(
    store: Arc<SessionStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = store.evict_expired().await;
                    if evicted > 0 {
                        tracing::info!(evicted, "Evicted expired sessions");
                    }
                }
            }
        }
    })
}
