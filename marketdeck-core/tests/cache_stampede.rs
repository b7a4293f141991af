//! Concurrency tests for the TTL cache's single-flight behavior.
//!
//! Many threads missing the same key at once must produce exactly one
//! compute invocation; the rest block and take the leader's outcome. Keys
//! never serialize behind each other, and a failed flight leaves nothing
//! behind.

use marketdeck_core::data::{CacheKey, TtlCache};
use marketdeck_core::domain::Provider;
use marketdeck_core::error::DataError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(60);

#[test]
fn concurrent_misses_collapse_to_one_compute() {
    const THREADS: usize = 16;

    let cache: TtlCache<u64> = TtlCache::new();
    let calls = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);
    let key = CacheKey::new(Provider::Crypto, "bitcoin", &("chart", 7u32));

    let results: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = &cache;
                let calls = &calls;
                let barrier = &barrier;
                let key = key.clone();
                s.spawn(move || {
                    barrier.wait();
                    cache
                        .resolve(key, TTL, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            // Slow compute keeps every other thread waiting
                            // on this flight instead of starting its own.
                            thread::sleep(Duration::from_millis(50));
                            Ok(42)
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1, "only the leader computes");
    assert_eq!(results.len(), THREADS);
    assert!(results.iter().all(|&v| v == 42), "waiters get the leader's value");

    // The entry is cached now; another resolve must not compute.
    let again = cache
        .resolve(key, TTL, || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        })
        .unwrap();
    assert_eq!(again, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn leader_error_fans_out_to_waiters_and_is_not_cached() {
    const THREADS: usize = 8;

    let cache: TtlCache<u64> = TtlCache::new();
    let calls = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);
    let key = CacheKey::new(Provider::Equity, "AAPL", &());

    let results: Vec<Result<u64, DataError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = &cache;
                let calls = &calls;
                let barrier = &barrier;
                let key = key.clone();
                s.spawn(move || {
                    barrier.wait();
                    cache.resolve(key, TTL, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        Err(DataError::Cache("upstream exploded".into()))
                    })
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "one failing flight serves every waiter"
    );
    for result in &results {
        assert!(
            matches!(result, Err(DataError::Cache(_))),
            "waiters share the leader's error, got {result:?}"
        );
    }

    // The error was fanned out but never stored, so the key is retryable.
    let recovered = cache.resolve(key, TTL, || Ok(7)).unwrap();
    assert_eq!(recovered, 7);
}

#[test]
fn distinct_keys_compute_in_parallel() {
    let cache: TtlCache<u64> = TtlCache::new();
    let in_flight = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);

    thread::scope(|s| {
        for (symbol, value) in [("GC=F", 1), ("SI=F", 2)] {
            let cache = &cache;
            let in_flight = &in_flight;
            let peak = &peak;
            s.spawn(move || {
                let key = CacheKey::new(Provider::Commodity, symbol, &());
                let got = cache
                    .resolve(key, TTL, || {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(100));
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok(value)
                    })
                    .unwrap();
                assert_eq!(got, value);
            });
        }
    });

    assert_eq!(
        peak.load(Ordering::SeqCst),
        2,
        "unrelated keys must not serialize behind one flight"
    );
}

#[test]
fn stampede_after_expiry_also_collapses() {
    const THREADS: usize = 8;

    let cache: TtlCache<u64> = TtlCache::new();
    let calls = AtomicUsize::new(0);
    let key = CacheKey::new(Provider::Crypto, "ethereum", &());

    let seed = cache
        .resolve(key.clone(), Duration::from_millis(10), || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        })
        .unwrap();
    assert_eq!(seed, 1);
    thread::sleep(Duration::from_millis(15));

    let barrier = Barrier::new(THREADS);
    let results: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = &cache;
                let calls = &calls;
                let barrier = &barrier;
                let key = key.clone();
                s.spawn(move || {
                    barrier.wait();
                    cache
                        .resolve(key, TTL, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            Ok(2)
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 2, "seed plus one refresh flight");
    assert!(results.iter().all(|&v| v == 2), "expired value is never served");
}
