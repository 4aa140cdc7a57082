//! Integration tests for the engine and cache.
//!
//! These run the cache on top of a real `RecommendationEngine` and check
//! ordering, exclusion and accounting on larger synthetic datasets, plus
//! the concurrency guarantees of the cache.

use data_loader::{Catalog, Dataset, SimilarityMatrix};
use recommender::{
    CacheStats, Recommendation, RecommendError, RecommendationCache, RecommendationEngine,
    Recommender,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn abc_engine() -> Arc<RecommendationEngine> {
    let catalog = Catalog::from_titles(["A", "B", "C"]).unwrap();
    let matrix = SimilarityMatrix::from_rows(vec![
        vec![1.0, 0.9, 0.2],
        vec![0.9, 1.0, 0.4],
        vec![0.2, 0.4, 1.0],
    ])
    .unwrap();
    Arc::new(RecommendationEngine::new(Dataset::new(catalog, matrix).unwrap()))
}

/// N-movie dataset with plenty of tied scores.
///
/// Cells come from a small LCG quantised to quarters, so every row has
/// many equal values and the tie-break rule is exercised.
fn synthetic_engine(n: usize) -> Arc<RecommendationEngine> {
    let titles: Vec<String> = (0..n).map(|i| format!("Movie {i:03}")).collect();
    let mut state: u64 = 42;
    let rows = (0..n)
        .map(|_| {
            (0..n)
                .map(|_| {
                    state = state
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    ((state >> 33) % 5) as f32 / 4.0
                })
                .collect()
        })
        .collect();
    let catalog = Catalog::from_titles(titles).unwrap();
    let matrix = SimilarityMatrix::from_rows(rows).unwrap();
    Arc::new(RecommendationEngine::new(Dataset::new(catalog, matrix).unwrap()))
}

#[test]
fn test_cached_three_movie_example() {
    let cache = RecommendationCache::new(abc_engine(), 10);

    let recs = cache.get("A", 2).unwrap();
    assert_eq!(
        &recs[..],
        &[
            Recommendation {
                title: "B".to_string(),
                similarity_score: 90.0,
            },
            Recommendation {
                title: "C".to_string(),
                similarity_score: 20.0,
            },
        ]
    );

    assert_eq!(cache.get("A", 10).unwrap().len(), 2);
}

#[test]
fn test_results_exclude_self_and_are_capped() {
    let engine = synthetic_engine(40);

    for title in engine.catalog().all_titles() {
        for count in [1, 5, 39, 100] {
            let recs = engine.recommend(title, count).unwrap();
            assert_eq!(recs.len(), count.min(39));
            assert!(recs.iter().all(|r| r.title != title), "{title} recommended itself");
        }
    }
}

#[test]
fn test_results_sorted_with_catalog_order_tie_break() {
    let engine = synthetic_engine(40);
    let catalog = engine.catalog();

    for title in catalog.all_titles() {
        let recs = engine.recommend(title, 39).unwrap();
        for pair in recs.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.similarity_score >= b.similarity_score);
            if a.similarity_score == b.similarity_score {
                let ia = catalog.lookup_index(&a.title).unwrap();
                let ib = catalog.lookup_index(&b.title).unwrap();
                assert!(ia < ib, "tie between {} and {} out of catalog order", a.title, b.title);
            }
        }
    }
}

#[test]
fn test_short_lists_are_prefixes_of_long_lists() {
    let engine = synthetic_engine(30);

    for title in engine.catalog().all_titles() {
        let full = engine.recommend(title, 29).unwrap();
        for count in [1, 3, 10] {
            assert_eq!(engine.recommend(title, count).unwrap(), full[..count]);
        }
    }
}

#[test]
fn test_idempotent_and_accounted() {
    let cache = RecommendationCache::new(synthetic_engine(20), 100);

    let first = cache.get("Movie 007", 5).unwrap();
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 0,
            misses: 1,
            size: 1,
            capacity: 100,
        }
    );

    let second = cache.get("Movie 007", 5).unwrap();
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            size: 1,
            capacity: 100,
        }
    );
    assert_eq!(first, second);

    // Still equal after being recomputed from scratch
    cache.clear();
    let third = cache.get("Movie 007", 5).unwrap();
    assert_eq!(first, third);
}

#[test]
fn test_unknown_movie_never_hits() {
    let cache = RecommendationCache::new(abc_engine(), 10);

    for _ in 0..5 {
        assert!(matches!(
            cache.get("Unknown Movie", 5),
            Err(RecommendError::NotFound(_))
        ));
    }
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.size), (0, 5, 0));
}

#[test]
fn test_eviction_order_with_engine() {
    let cache = RecommendationCache::new(synthetic_engine(10), 4);

    for i in 0..4 {
        cache.get(&format!("Movie {i:03}"), 3).unwrap();
    }
    // Touch the oldest key, then overflow
    cache.get("Movie 000", 3).unwrap();
    cache.get("Movie 009", 3).unwrap();

    assert!(cache.contains("Movie 000", 3));
    assert!(!cache.contains("Movie 001", 3));
    assert!(cache.contains("Movie 009", 3));
    assert_eq!(cache.stats().size, 4);
}

/// Wraps an engine, counting calls and sleeping to widen race windows
struct SlowCounting {
    inner: Arc<RecommendationEngine>,
    calls: AtomicUsize,
}

impl Recommender for SlowCounting {
    fn recommend(&self, title: &str, count: usize) -> recommender::Result<Vec<Recommendation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        self.inner.recommend(title, count)
    }
}

#[test]
fn test_one_compute_per_key_under_contention() {
    let slow = Arc::new(SlowCounting {
        inner: abc_engine(),
        calls: AtomicUsize::new(0),
    });
    let cache = Arc::new(RecommendationCache::new(slow.clone(), 10));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.get("A", 2).unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
    assert!(results.windows(2).all(|w| w[0] == w[1]));

    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 8);
    assert_eq!(stats.size, 1);
}

/// Blocks on "C" until released; everything else answers immediately
struct Gated {
    inner: Arc<RecommendationEngine>,
    calls: AtomicUsize,
    entered: mpsc::SyncSender<()>,
    release: parking_lot::Mutex<mpsc::Receiver<()>>,
}

impl Recommender for Gated {
    fn recommend(&self, title: &str, count: usize) -> recommender::Result<Vec<Recommendation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if title == "C" {
            self.entered.send(()).ok();
            self.release.lock().recv().ok();
        }
        self.inner.recommend(title, count)
    }
}

/// Cache over a `Gated` engine, plus the channels that drive the gate
fn gated_cache() -> (
    Arc<RecommendationCache>,
    Arc<Gated>,
    mpsc::Receiver<()>,
    mpsc::Sender<()>,
) {
    let (entered_tx, entered_rx) = mpsc::sync_channel(2);
    let (release_tx, release_rx) = mpsc::channel();
    let gated = Arc::new(Gated {
        inner: abc_engine(),
        calls: AtomicUsize::new(0),
        entered: entered_tx,
        release: parking_lot::Mutex::new(release_rx),
    });
    let cache = Arc::new(RecommendationCache::new(gated.clone(), 10));
    (cache, gated, entered_rx, release_tx)
}

#[test]
fn test_other_keys_not_blocked_by_slow_compute() {
    let (cache, _, entered, release) = gated_cache();

    let slow = {
        let cache = cache.clone();
        thread::spawn(move || cache.get("C", 1).unwrap())
    };
    entered.recv().unwrap();

    // "C" is mid-compute; "A" must still go through
    let fast = cache.get("A", 1).unwrap();
    assert_eq!(fast[0].title, "B");

    release.send(()).unwrap();
    let slow = slow.join().unwrap();
    assert_eq!(slow[0].title, "B");
    assert_eq!(cache.stats().size, 2);
}

#[test]
fn test_clear_discards_running_compute() {
    let (cache, gated, entered, release) = gated_cache();

    let running = {
        let cache = cache.clone();
        thread::spawn(move || cache.get("C", 1))
    };
    entered.recv().unwrap();

    cache.clear();
    release.send(()).unwrap();

    // The caller still gets its answer, but it is not stored
    let recs = running.join().unwrap().unwrap();
    assert_eq!(recs[0].title, "B");
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 0,
            misses: 0,
            size: 0,
            capacity: 10,
        }
    );
    assert!(!cache.contains("C", 1));

    // So the next lookup is a miss that computes again
    release.send(()).unwrap();
    let again = cache.get("C", 1).unwrap();
    entered.recv().unwrap();
    assert_eq!(again[0].title, "B");
    assert_eq!(gated.calls.load(Ordering::SeqCst), 2);

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.size), (0, 1, 1));

    cache.get("C", 1).unwrap();
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(gated.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_caller_after_clear_starts_fresh_compute() {
    let (cache, gated, entered, release) = gated_cache();

    let before = {
        let cache = cache.clone();
        thread::spawn(move || cache.get("C", 1))
    };
    entered.recv().unwrap();

    cache.clear();

    // Must not wait on the compute that started before the clear
    let after = {
        let cache = cache.clone();
        thread::spawn(move || cache.get("C", 1))
    };
    entered
        .recv_timeout(Duration::from_secs(5))
        .expect("caller after clear should start its own compute");

    release.send(()).unwrap();
    release.send(()).unwrap();
    assert_eq!(before.join().unwrap().unwrap()[0].title, "B");
    assert_eq!(after.join().unwrap().unwrap()[0].title, "B");

    assert_eq!(gated.calls.load(Ordering::SeqCst), 2);
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.size), (0, 1, 1));
    assert!(cache.contains("C", 1));
}

/// Panics on its first call, then behaves
struct PanicsOnce {
    inner: Arc<RecommendationEngine>,
    armed: AtomicBool,
}

impl Recommender for PanicsOnce {
    fn recommend(&self, title: &str, count: usize) -> recommender::Result<Vec<Recommendation>> {
        if self.armed.swap(false, Ordering::SeqCst) {
            panic!("simulated compute failure");
        }
        self.inner.recommend(title, count)
    }
}

#[test]
fn test_panicking_compute_leaves_cache_usable() {
    let cache = Arc::new(RecommendationCache::new(
        Arc::new(PanicsOnce {
            inner: abc_engine(),
            armed: AtomicBool::new(true),
        }),
        10,
    ));

    let crashed = {
        let cache = cache.clone();
        thread::spawn(move || cache.get("A", 2))
    };
    assert!(crashed.join().is_err());

    let recs = cache.get("A", 2).unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(cache.stats().size, 1);
}
