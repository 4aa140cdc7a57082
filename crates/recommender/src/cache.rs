//! Memoization cache in front of a `Recommender`.
//!
//! Bounded LRU keyed by the exact `(title, count)` pair. Only successful
//! results are stored; every error is recomputed on the next call.
//!
//! ## Concurrency
//! - LRU bookkeeping and counters live behind one `parking_lot::Mutex`,
//!   held only for map updates, never while computing
//! - At most one compute runs per key: the first caller on a miss registers
//!   a `OnceLock` for the key, and concurrent callers for the same key block
//!   on that cell and share its result
//! - Different keys compute in parallel
//!
//! Recency is a monotonically increasing tick. `recency` maps tick -> key,
//! so the least recently used key is always the first entry.

use crate::error::Result;
use crate::traits::Recommender;
use crate::types::{CacheStats, DEFAULT_CACHE_CAPACITY, Recommendation};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument};

/// Exact lookup key: no trimming or case-folding
type CacheKey = (String, usize);

/// Cached results are shared, not copied, between callers
pub type SharedRecommendations = Arc<[Recommendation]>;

type Outcome = Result<SharedRecommendations>;

struct CacheEntry {
    value: SharedRecommendations,
    last_used: u64,
}

/// A compute in progress for one key
struct InFlight {
    cell: Arc<OnceLock<Outcome>>,
    /// Value of `CacheState::generation` when the compute started
    generation: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    recency: BTreeMap<u64, CacheKey>,
    in_flight: HashMap<CacheKey, InFlight>,
    tick: u64,
    /// Bumped by `clear` so computes started earlier don't repopulate
    generation: u64,
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Return a cached value and mark it most recently used
    fn touch(&mut self, key: &CacheKey) -> Option<SharedRecommendations> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.last_used);
        entry.last_used = tick;
        self.recency.insert(tick, key.clone());
        Some(entry.value.clone())
    }

    fn insert(&mut self, key: CacheKey, value: SharedRecommendations, capacity: usize) {
        if self.entries.contains_key(&key) {
            self.touch(&key);
            return;
        }

        while self.entries.len() >= capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!("Evicted '{}' (count {})", oldest.0, oldest.1);
        }

        let tick = self.next_tick();
        self.recency.insert(tick, key.clone());
        self.entries.insert(key, CacheEntry { value, last_used: tick });
    }

    /// Drop the in-flight marker for `key` if it is still ours
    fn finish_in_flight(&mut self, key: &CacheKey, cell: &Arc<OnceLock<Outcome>>) {
        let ours = self
            .in_flight
            .get(key)
            .is_some_and(|flight| Arc::ptr_eq(&flight.cell, cell));
        if ours {
            self.in_flight.remove(key);
        }
    }
}

/// Removes the in-flight marker if the compute unwinds.
///
/// Without this a panicking compute would leave the key marked in flight
/// forever and later callers would wait on a cell nobody fills.
struct InFlightGuard<'a> {
    state: &'a Mutex<CacheState>,
    key: &'a CacheKey,
    cell: &'a Arc<OnceLock<Outcome>>,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().finish_in_flight(self.key, self.cell);
        }
    }
}

/// Process-wide, thread-safe memoization of recommendation results.
///
/// Construct once at startup and share behind an `Arc`.
pub struct RecommendationCache {
    recommender: Arc<dyn Recommender>,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl RecommendationCache {
    /// Create a cache holding at most `capacity` keys (minimum 1)
    pub fn new(recommender: Arc<dyn Recommender>, capacity: usize) -> Self {
        Self {
            recommender,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Create a cache with `DEFAULT_CACHE_CAPACITY`
    pub fn with_default_capacity(recommender: Arc<dyn Recommender>) -> Self {
        Self::new(recommender, DEFAULT_CACHE_CAPACITY)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached recommendations for `(title, count)`, computing them on a miss.
    ///
    /// Counts one hit or one miss per call. Errors are returned but never
    /// stored.
    #[instrument(skip(self), level = "debug")]
    pub fn get(&self, title: &str, count: usize) -> Outcome {
        let key: CacheKey = (title.to_string(), count);

        let (cell, generation) = {
            let mut state = self.state.lock();
            if let Some(value) = state.touch(&key) {
                state.hits += 1;
                debug!("Cache hit");
                return Ok(value);
            }
            state.misses += 1;

            let generation = state.generation;
            let flight = state.in_flight.entry(key.clone()).or_insert_with(|| InFlight {
                cell: Arc::new(OnceLock::new()),
                generation,
            });
            (flight.cell.clone(), flight.generation)
        };

        let guard = InFlightGuard {
            state: &self.state,
            key: &key,
            cell: &cell,
            armed: true,
        };
        // Blocks here if another caller is already computing this key
        let outcome = cell
            .get_or_init(|| {
                debug!("Cache miss, computing");
                self.recommender
                    .recommend(title, count)
                    .map(SharedRecommendations::from)
            })
            .clone();
        guard.disarm();

        let mut state = self.state.lock();
        state.finish_in_flight(&key, &cell);
        if let Ok(value) = &outcome {
            if generation == state.generation {
                state.insert(key, value.clone(), self.capacity);
            }
        }
        outcome
    }

    /// Current counters. May lag computes that are still running.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            size: state.entries.len(),
            capacity: self.capacity,
        }
    }

    /// Empty the cache and reset counters in one step, returning the
    /// post-clear snapshot.
    ///
    /// Computes already running still answer their callers but are not
    /// stored.
    pub fn clear(&self) -> CacheStats {
        let mut state = self.state.lock();
        let generation = state.generation + 1;
        *state = CacheState {
            generation,
            ..CacheState::default()
        };
        debug!("Cache cleared");
        CacheStats {
            hits: 0,
            misses: 0,
            size: 0,
            capacity: self.capacity,
        }
    }

    /// Whether a key is currently cached. Does not count as a lookup.
    pub fn contains(&self, title: &str, count: usize) -> bool {
        self.state
            .lock()
            .entries
            .contains_key(&(title.to_string(), count))
    }
}
