//! Replay-protection nonce ledger.
//!
//! The [`NonceLedger`] trait abstracts the store that remembers recently
//! accepted nonces, so the gate can be backed by an in-process map or a
//! distributed cache. [`InMemoryNonceLedger`] is the in-process
//! implementation.
//!
//! Plain `get` followed by `set` leaves a window in which two requests with
//! the same nonce both observe "not found". The gate therefore commits through
//! [`NonceLedger::insert_if_absent`], which backends must implement atomically
//! to guarantee at-most-once acceptance under concurrency.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Presence marker stored for a committed nonce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonceMarker;

/// A time-bounded set of recently seen nonces.
#[async_trait::async_trait]
pub trait NonceLedger: Send + Sync {
    /// Look up a nonce. `Some` means it was committed and has not expired.
    async fn get(&self, nonce: &str) -> Option<NonceMarker>;

    /// Insert or overwrite an entry that expires after `ttl`.
    async fn set(&self, nonce: &str, marker: NonceMarker, ttl: Duration);

    /// Insert an entry only if no live entry exists for `nonce`.
    ///
    /// Returns `true` if this call created the entry and `false` if the nonce
    /// was already present. The default implementation is `get` then `set` and
    /// is not atomic; stores that support compare-and-swap semantics should
    /// override it.
    async fn insert_if_absent(&self, nonce: &str, marker: NonceMarker, ttl: Duration) -> bool {
        if self.get(nonce).await.is_some() {
            return false;
        }
        self.set(nonce, marker, ttl).await;
        true
    }
}

/// In-memory nonce ledger with TTL-based expiry.
///
/// Expired entries are dropped lazily when read and in bulk by
/// [`purge_expired`](Self::purge_expired). Expiry uses the tokio clock.
#[derive(Debug, Default)]
pub struct InMemoryNonceLedger {
    entries: DashMap<String, Instant>,
}

impl InMemoryNonceLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Spawn a background task that purges expired entries every `interval`.
    ///
    /// The task holds a weak reference and ends once the ledger is dropped.
    pub fn spawn_purge_task(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let ledger: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(ledger) = ledger.upgrade() else {
                    break;
                };
                let purged = ledger.purge_expired();
                if purged > 0 {
                    debug!(purged, remaining = ledger.len(), "purged expired nonces");
                }
            }
        })
    }
}

#[async_trait::async_trait]
impl NonceLedger for InMemoryNonceLedger {
    async fn get(&self, nonce: &str) -> Option<NonceMarker> {
        let now = Instant::now();
        // The read guard must be released before `remove_if` locks the shard.
        let live = self.entries.get(nonce).map(|expires_at| *expires_at > now);
        match live {
            Some(true) => Some(NonceMarker),
            Some(false) => {
                self.entries.remove_if(nonce, |_, expires_at| *expires_at <= now);
                None
            }
            None => None,
        }
    }

    async fn set(&self, nonce: &str, _marker: NonceMarker, ttl: Duration) {
        self.entries.insert(nonce.to_owned(), Instant::now() + ttl);
    }

    async fn insert_if_absent(&self, nonce: &str, _marker: NonceMarker, ttl: Duration) -> bool {
        let now = Instant::now();
        match self.entries.entry(nonce.to_owned()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    false
                } else {
                    entry.insert(now + ttl);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now + ttl);
                true
            }
        }
    }
}
