//! Bounded LRU cache of built repository indexes with single-flight builds.
//!
//! The lock guards only bookkeeping (entries, recency, in-flight builds) and
//! is never held across an await. A miss spawns the build as its own task and
//! records a shared handle to it; concurrent requests for the same key await
//! that handle instead of starting another build. Requests for other keys are
//! unaffected. Failed builds leave no entry behind.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::error::ContextError;
use crate::models::RepoKey;

type BuildResult<V> = Result<Arc<V>, ContextError>;
type InFlight<V> = Shared<BoxFuture<'static, BuildResult<V>>>;

struct Slot<V> {
    entry: Arc<V>,
    /// Position in the recency index
    stamp: u64,
    built_at: Instant,
    built_at_utc: DateTime<Utc>,
}

struct Inner<V> {
    entries: HashMap<RepoKey, Slot<V>>,
    /// Recency index: smallest stamp is least recently used
    recency: BTreeMap<u64, RepoKey>,
    next_stamp: u64,
    in_flight: HashMap<RepoKey, InFlight<V>>,
}

impl<V> Inner<V> {
    fn stamp(&mut self) -> u64 {
        self.next_stamp += 1;
        self.next_stamp
    }

    fn is_expired(slot: &Slot<V>, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| slot.built_at.elapsed() >= ttl)
    }

    /// Drop every entry older than `ttl`.
    fn purge_expired(&mut self, ttl: Option<Duration>) {
        if ttl.is_none() {
            return;
        }
        let expired: Vec<RepoKey> = self
            .entries
            .iter()
            .filter(|(_, slot)| Self::is_expired(slot, ttl))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            tracing::info!("Cache entry for {key} expired");
            self.remove(&key);
        }
    }

    /// Return a live entry and mark it most recently used.
    fn touch(&mut self, key: &RepoKey, ttl: Option<Duration>) -> Option<Arc<V>> {
        if Self::is_expired(self.entries.get(key)?, ttl) {
            tracing::info!("Cache entry for {key} expired");
            self.remove(key);
            return None;
        }

        let stamp = self.stamp();
        let slot = self.entries.get_mut(key)?;
        self.recency.remove(&slot.stamp);
        slot.stamp = stamp;
        self.recency.insert(stamp, key.clone());
        Some(slot.entry.clone())
    }

    fn insert(&mut self, key: RepoKey, entry: Arc<V>, capacity: usize, ttl: Option<Duration>) {
        self.remove(&key);
        self.purge_expired(ttl);

        let stamp = self.stamp();
        self.recency.insert(stamp, key.clone());
        self.entries.insert(
            key,
            Slot {
                entry,
                stamp,
                built_at: Instant::now(),
                built_at_utc: Utc::now(),
            },
        );

        while self.entries.len() > capacity {
            let Some((_, victim)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&victim);
            tracing::info!("Evicted {victim} from repository cache");
        }
    }

    fn remove(&mut self, key: &RepoKey) {
        if let Some(old) = self.entries.remove(key) {
            self.recency.remove(&old.stamp);
        }
    }
}

/// A resident cache entry as reported to callers.
#[derive(Debug, Clone)]
pub struct Resident<V> {
    pub key: RepoKey,
    pub entry: Arc<V>,
    pub built_at: DateTime<Utc>,
}

pub struct RepoCache<V> {
    capacity: usize,
    ttl: Option<Duration>,
    inner: Arc<Mutex<Inner<V>>>,
}

impl<V> RepoCache<V>
where
    V: Send + Sync + 'static,
{
    /// `ttl = None` keeps entries until they are evicted by capacity pressure.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            capacity,
            ttl,
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                next_stamp: 0,
                in_flight: HashMap::new(),
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live (unexpired) entries.
    pub fn size(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.purge_expired(self.ttl);
        inner.entries.len()
    }

    /// Look up an entry without refreshing its recency.
    pub fn peek(&self, key: &RepoKey) -> Option<Arc<V>> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .filter(|slot| !Inner::is_expired(slot, self.ttl))
            .map(|slot| slot.entry.clone())
    }

    /// Snapshot of resident entries, sorted by key.
    pub fn resident(&self) -> Vec<Resident<V>> {
        let mut inner = self.inner.lock();
        inner.purge_expired(self.ttl);
        let mut resident: Vec<Resident<V>> = inner
            .entries
            .iter()
            .map(|(key, slot)| Resident {
                key: key.clone(),
                entry: slot.entry.clone(),
                built_at: slot.built_at_utc,
            })
            .collect();
        resident.sort_by(|a, b| a.key.cmp(&b.key));
        resident
    }

    /// Return the cached entry for `key`, building it with `build` on a miss.
    ///
    /// At most one build per key runs at a time; concurrent callers share its
    /// result. The build runs in its own task, so it completes even if every
    /// caller stops waiting.
    pub async fn get_or_build<F, Fut>(&self, key: &RepoKey, build: F) -> BuildResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ContextError>> + Send + 'static,
    {
        let pending = {
            let mut inner = self.inner.lock();

            if let Some(entry) = inner.touch(key, self.ttl) {
                tracing::info!("Cache hit for {key}");
                return Ok(entry);
            }

            match inner.in_flight.get(key) {
                Some(pending) => {
                    tracing::info!("Joining in-flight build for {key}");
                    pending.clone()
                }
                None => {
                    tracing::info!("Cache miss for {key}, building");
                    let pending = self.spawn_build(key.clone(), build());
                    inner.in_flight.insert(key.clone(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn spawn_build<Fut>(&self, key: RepoKey, build: Fut) -> InFlight<V>
    where
        Fut: Future<Output = Result<V, ContextError>> + Send + 'static,
    {
        let inner = self.inner.clone();
        let (capacity, ttl) = (self.capacity, self.ttl);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let result = build.await.map(Arc::new);
            finish_build(&inner, task_key, &result, capacity, ttl);
            result
        });

        let inner = self.inner.clone();
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    inner.lock().in_flight.remove(&key);
                    tracing::error!("Build task for {key} aborted: {e}");
                    Err(ContextError::Internal(format!("build for {key} aborted")))
                }
            }
        }
        .boxed()
        .shared()
    }
}

fn finish_build<V>(
    inner: &Mutex<Inner<V>>,
    key: RepoKey,
    result: &BuildResult<V>,
    capacity: usize,
    ttl: Option<Duration>,
) {
    let mut inner = inner.lock();
    inner.in_flight.remove(&key);
    match result {
        Ok(entry) => {
            tracing::info!("Cached {key}");
            inner.insert(key, entry.clone(), capacity, ttl);
        }
        Err(e) => tracing::warn!("Build for {key} failed: {e}"),
    }
}
