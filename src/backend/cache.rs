//! Client cache for the backend
//!
//! Holds the Connect client handle and the default vault ID between
//! requests. Entries are stored per key in a [`DashMap`], so get, set and
//! delete are atomic per key with no cross-key transactions.
//!
//! Entries written with [`Expiration::Default`] expire after the configured
//! lifetime and are removed lazily on read or by the background sweeper.
//! The backend writes both of its keys with [`Expiration::Never`] and relies
//! on explicit eviction when the stored configuration changes.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::connect::ConnectClient;

/// Keys the backend caches values under
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Client,
    DefaultVault,
}

impl CacheKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Client => "client",
            CacheKey::DefaultVault => "default-vault",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached value
#[derive(Clone)]
pub enum CachedValue {
    Client(Arc<dyn ConnectClient>),
    DefaultVault(String),
}

impl fmt::Debug for CachedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachedValue::Client(_) => f.write_str("Client(..)"),
            CachedValue::DefaultVault(id) => f.debug_tuple("DefaultVault").field(id).finish(),
        }
    }
}

/// Lifetime of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Kept until evicted or the cache is cleared
    Never,
    /// Expires after the cache's default lifetime
    Default,
    /// Expires after the given duration
    After(Duration),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

type Entries = DashMap<CacheKey, CacheEntry>;

/// Expiring, concurrency-safe cache owned by a backend instance
pub struct ClientCache {
    entries: Arc<Entries>,
    default_expiration: Duration,
    cleanup_interval: Duration,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCache")
            .field("entries", &self.entries.len())
            .field("default_expiration", &self.default_expiration)
            .field("cleanup_interval", &self.cleanup_interval)
            .finish()
    }
}

impl ClientCache {
    pub fn new(default_expiration: Duration, cleanup_interval: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            default_expiration,
            cleanup_interval,
            sweeper: Mutex::new(None),
        }
    }

    /// Get a value if present and not expired
    pub fn get(&self, key: CacheKey) -> Option<CachedValue> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(&key) {
            if !entry.is_expired(now) {
                debug!(key = %key, "Cache hit");
                return Some(entry.value.clone());
            }
        } else {
            debug!(key = %key, "Cache miss");
            return None;
        }

        // the read guard above is dropped before removal to avoid deadlocking the shard
        self.entries.remove_if(&key, |_, entry| entry.is_expired(now));
        debug!(key = %key, "Cache entry expired");
        None
    }

    /// Store a value, replacing any previous one
    pub fn set(&self, key: CacheKey, value: CachedValue, expiration: Expiration) {
        let expires_at = match expiration {
            Expiration::Never => None,
            Expiration::Default => Some(Instant::now() + self.default_expiration),
            Expiration::After(ttl) => Some(Instant::now() + ttl),
        };
        debug!(key = %key, expiration = ?expiration, "Caching value");
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Evict a single entry
    pub fn delete(&self, key: CacheKey) {
        if self.entries.remove(&key).is_some() {
            debug!(key = %key, "Evicted cache entry");
        }
    }

    /// Cached client handle, if any
    pub fn client(&self) -> Option<Arc<dyn ConnectClient>> {
        match self.get(CacheKey::Client)? {
            CachedValue::Client(client) => Some(client),
            CachedValue::DefaultVault(_) => None,
        }
    }

    /// Cached default vault ID, if any
    pub fn default_vault(&self) -> Option<String> {
        match self.get(CacheKey::DefaultVault)? {
            CachedValue::DefaultVault(id) => Some(id),
            CachedValue::Client(_) => None,
        }
    }

    /// Remove every entry
    pub fn clear(&self) {
        debug!("Clearing client cache");
        self.entries.clear();
    }

    /// Remove expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Start the background sweeper if it is not already running.
    ///
    /// The task only holds a weak reference to the entries and exits once
    /// the cache is dropped. Requires a Tokio runtime; without one the
    /// sweeper is skipped and expired entries are dropped on read.
    pub fn start_sweeper(&self) {
        let Ok(mut sweeper) = self.sweeper.lock() else {
            warn!("Client cache sweeper lock poisoned; sweeper not started");
            return;
        };
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No Tokio runtime available; client cache sweeper not started");
            return;
        };

        let entries = Arc::downgrade(&self.entries);
        let interval = self.cleanup_interval;
        *sweeper = Some(runtime.spawn(sweep_loop(entries, interval)));
        debug!(interval_secs = interval.as_secs(), "Started client cache sweeper");
    }

    /// Stop the background sweeper
    pub fn stop_sweeper(&self) {
        if let Ok(mut sweeper) = self.sweeper.lock() {
            if let Some(handle) = sweeper.take() {
                handle.abort();
                debug!("Stopped client cache sweeper");
            }
        }
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper
            .lock()
            .map(|s| s.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for ClientCache {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}

fn purge(entries: &Entries) -> usize {
    let now = Instant::now();
    let before = entries.len();
    entries.retain(|key, entry| {
        let expired = entry.is_expired(now);
        if expired {
            debug!(key = %key, "Removing expired cache entry");
        }
        !expired
    });
    before.saturating_sub(entries.len())
}

async fn sweep_loop(entries: Weak<Entries>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(entries) = entries.upgrade() else {
            break;
        };
        purge(&entries);
    }
}
