//! Keyed fetch cache with in-flight deduplication.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};

use crate::key::QueryKey;

/// Default number of resolved entries kept.
pub const DEFAULT_CAPACITY: usize = 256;

/// How a lookup was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Resolved entry reused.
    Hit,
    /// No entry; a fetch was started.
    Miss,
    /// Joined a fetch already in flight for the key.
    Joined,
    /// Existing entry bypassed on request; a fresh fetch was started.
    Revalidated,
}

impl CacheStatus {
    /// Whether this lookup issued a network request of its own.
    pub fn fetched(&self) -> bool {
        matches!(self, Self::Miss | Self::Revalidated)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Joined => write!(f, "JOINED"),
            Self::Revalidated => write!(f, "REVALIDATED"),
        }
    }
}

type SharedFetch<T, E> = Shared<BoxFuture<'static, Result<Arc<T>, E>>>;

enum Slot<T, E> {
    Ready(Arc<T>),
    Pending { id: u64, fetch: SharedFetch<T, E> },
}

struct Slots<T, E> {
    entries: HashMap<QueryKey, Slot<T, E>>,
    /// Resolved keys, oldest first.
    order: VecDeque<QueryKey>,
}

/// Result cache keyed by [`QueryKey`].
///
/// Identical keys share one in-flight fetch, and a resolved result is reused
/// until the caller asks for revalidation. Failures are never stored: the
/// next lookup after an error fetches again.
pub struct FetchCache<T, E> {
    slots: Mutex<Slots<T, E>>,
    capacity: usize,
    next_id: AtomicU64,
}

impl<T, E> Default for FetchCache<T, E>
where
    T: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T, E> FetchCache<T, E>
where
    T: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `capacity` resolved entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots<T, E>> {
        // A panic while holding the lock cannot leave a slot half-written.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolved entry for `key`, if any.
    pub fn get(&self, key: &QueryKey) -> Option<Arc<T>> {
        match self.lock().entries.get(key) {
            Some(Slot::Ready(value)) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Whether a fetch for `key` is in flight.
    pub fn is_pending(&self, key: &QueryKey) -> bool {
        matches!(self.lock().entries.get(key), Some(Slot::Pending { .. }))
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.lock()
            .entries
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the entry for `key`, resolved or pending.
    pub fn invalidate(&self, key: &QueryKey) {
        let mut slots = self.lock();
        slots.entries.remove(key);
        slots.order.retain(|k| k != key);
    }

    pub fn clear(&self) {
        let mut slots = self.lock();
        slots.entries.clear();
        slots.order.clear();
    }

    /// Get the result for `key`, fetching it if needed.
    ///
    /// With `revalidate` unset, a resolved entry is returned as is and an
    /// in-flight fetch is joined. With `revalidate` set, a new fetch always
    /// starts and replaces whatever the key held; an older fetch for the key
    /// that completes later does not overwrite it.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &QueryKey,
        revalidate: bool,
        fetch: F,
    ) -> (Result<Arc<T>, E>, CacheStatus)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (id, shared, status) = {
            let mut slots = self.lock();

            let existing = if revalidate {
                None
            } else {
                match slots.entries.get(key) {
                    Some(Slot::Ready(value)) => {
                        return (Ok(Arc::clone(value)), CacheStatus::Hit);
                    }
                    Some(Slot::Pending { id, fetch }) => Some((*id, fetch.clone())),
                    None => None,
                }
            };

            match existing {
                Some((id, shared)) => (id, shared, CacheStatus::Joined),
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let shared: SharedFetch<T, E> =
                        fetch().map(|result| result.map(Arc::new)).boxed().shared();
                    slots.entries.insert(
                        key.clone(),
                        Slot::Pending {
                            id,
                            fetch: shared.clone(),
                        },
                    );
                    let status = if revalidate {
                        CacheStatus::Revalidated
                    } else {
                        CacheStatus::Miss
                    };
                    (id, shared, status)
                }
            }
        };

        let result = shared.await;
        self.settle(key, id, &result);
        (result, status)
    }

    /// Store the outcome of fetch `id`, unless a newer fetch replaced it.
    fn settle(&self, key: &QueryKey, id: u64, result: &Result<Arc<T>, E>) {
        let mut slots = self.lock();
        let current = matches!(
            slots.entries.get(key),
            Some(Slot::Pending { id: pending, .. }) if *pending == id
        );
        if !current {
            return;
        }

        match result {
            Ok(value) => {
                slots.entries.insert(key.clone(), Slot::Ready(Arc::clone(value)));
                slots.order.retain(|k| k != key);
                slots.order.push_back(key.clone());
                self.evict(&mut slots);
            }
            Err(_) => {
                slots.entries.remove(key);
            }
        }
    }

    fn evict(&self, slots: &mut Slots<T, E>) {
        while slots.order.len() > self.capacity {
            if let Some(oldest) = slots.order.pop_front() {
                if matches!(slots.entries.get(&oldest), Some(Slot::Ready(_))) {
                    slots.entries.remove(&oldest);
                }
            }
        }
    }
}
