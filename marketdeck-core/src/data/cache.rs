//! TTL cache with single-flight miss collapsing.
//!
//! Each fetch operation owns its own cache instance, so operation identity
//! never needs to be part of the key. Expiry is lazy: entries are checked at
//! read time and nothing runs in the background.
//!
//! Concurrency contract: concurrent resolves for the *same* key collapse
//! onto one compute call; resolves for different keys never serialize behind
//! each other (the cross-key map lock is held only long enough to clone a
//! slot handle).

use crate::domain::Provider;
use crate::error::DataError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Cache identity: provider family, symbol, and a hash of the remaining
/// call parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: Provider,
    pub symbol: String,
    pub params_hash: String,
}

impl CacheKey {
    /// Builds a key from anything serializable that captures the call
    /// arguments beyond the symbol. Callers are responsible for canonical
    /// argument order (sorted id lists and the like) so equal argument sets
    /// hash equally.
    pub fn new(provider: Provider, symbol: impl Into<String>, params: &impl Serialize) -> Self {
        let json = serde_json::to_string(params).expect("cache key params serialization failed");
        let hash = blake3::hash(json.as_bytes());
        Self {
            provider,
            symbol: symbol.into(),
            params_hash: hash.to_hex().to_string(),
        }
    }
}

/// A cached value and the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

/// Per-key slot: the cached entry, the in-flight computation if any, and the
/// outcome of the most recently landed flight.
#[derive(Debug)]
struct SlotState<V> {
    entry: Option<CacheEntry<V>>,
    flight: Option<u64>,
    last_flight: Option<(u64, Result<V, DataError>)>,
}

#[derive(Debug)]
struct Slot<V> {
    state: Mutex<SlotState<V>>,
    ready: Condvar,
}

impl<V> Slot<V> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                entry: None,
                flight: None,
                last_flight: None,
            }),
            ready: Condvar::new(),
        }
    }
}

/// Publish a flight's outcome: cache the value on success, record the
/// outcome for waiters either way, and wake them.
fn land<V: Clone>(slot: &Slot<V>, flight_id: u64, outcome: &Result<V, DataError>, ttl: Duration) {
    let mut state = slot.state.lock().unwrap();
    if let Ok(value) = outcome {
        state.entry = Some(CacheEntry {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        });
    }
    state.flight = None;
    state.last_flight = Some((flight_id, outcome.clone()));
    drop(state);
    slot.ready.notify_all();
}

/// A leader that unwinds mid-compute must still release its waiters.
struct FlightGuard<'a, V: Clone> {
    slot: &'a Slot<V>,
    flight_id: u64,
    armed: bool,
}

impl<V: Clone> Drop for FlightGuard<'_, V> {
    fn drop(&mut self) {
        if self.armed {
            land(
                self.slot,
                self.flight_id,
                &Err(DataError::Cache("flight aborted before completing".into())),
                Duration::ZERO,
            );
        }
    }
}

/// In-memory TTL cache keyed by `CacheKey`, one instance per fetch operation.
#[derive(Debug)]
pub struct TtlCache<V> {
    slots: Mutex<HashMap<CacheKey, Arc<Slot<V>>>>,
    flight_seq: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            flight_seq: AtomicU64::new(0),
        }
    }

    fn slot(&self, key: &CacheKey) -> Arc<Slot<V>> {
        let mut slots = self.slots.lock().unwrap();
        Arc::clone(slots.entry(key.clone()).or_insert_with(|| Arc::new(Slot::new())))
    }

    /// Read-only lookup. Expired entries report as misses; they are removed
    /// lazily by `put`/`resolve` overwrites or by `purge_expired`.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry<V>> {
        let slots = self.slots.lock().unwrap();
        let slot = Arc::clone(slots.get(key)?);
        drop(slots);
        let state = slot.state.lock().unwrap();
        state
            .entry
            .clone()
            .filter(|e| e.expires_at > Instant::now())
    }

    /// Unconditional whole-entry overwrite. There is no partial update.
    pub fn put(&self, key: CacheKey, value: V, ttl: Duration) {
        let slot = self.slot(&key);
        let mut state = slot.state.lock().unwrap();
        state.entry = Some(CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        });
    }

    /// Serve a fresh entry, or collapse concurrent misses for `key` onto a
    /// single `compute` call.
    ///
    /// Exactly one caller (the leader) runs `compute`. Every other caller
    /// that misses while the flight is up blocks on the slot's condvar and
    /// receives the leader's outcome, error included. Errors are fanned out
    /// but never stored, so the next resolve after a failed flight retries.
    pub fn resolve<F>(&self, key: CacheKey, ttl: Duration, compute: F) -> Result<V, DataError>
    where
        F: FnOnce() -> Result<V, DataError>,
    {
        let slot = self.slot(&key);
        let mut state = slot.state.lock().unwrap();

        loop {
            if let Some(entry) = state.entry.as_ref().filter(|e| e.expires_at > Instant::now()) {
                return Ok(entry.value.clone());
            }

            match state.flight {
                None => {
                    let flight_id = self.flight_seq.fetch_add(1, Ordering::Relaxed);
                    state.flight = Some(flight_id);
                    drop(state);

                    let mut flight = FlightGuard {
                        slot: &slot,
                        flight_id,
                        armed: true,
                    };
                    let outcome = compute();
                    flight.armed = false;
                    land(&slot, flight_id, &outcome, ttl);
                    return outcome;
                }
                Some(flight_id) => {
                    while state.flight == Some(flight_id) {
                        state = slot.ready.wait(state).unwrap();
                    }
                    match state.last_flight.as_ref() {
                        Some((landed, outcome)) if *landed == flight_id => {
                            return outcome.clone();
                        }
                        // The flight we waited on was superseded before this
                        // thread woke; re-check the slot from the top.
                        _ => continue,
                    }
                }
            }
        }
    }

    /// Number of keys currently holding a live entry.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap();
        slots
            .values()
            .filter(|slot| {
                let state = slot.state.lock().unwrap();
                state
                    .entry
                    .as_ref()
                    .is_some_and(|e| e.expires_at > Instant::now())
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired entries and idle slots. Optional housekeeping; nothing
    /// calls this on a timer.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap();
        slots.retain(|_, slot| {
            let mut state = slot.state.lock().unwrap();
            if state.entry.as_ref().is_some_and(|e| e.expires_at <= now) {
                state.entry = None;
            }
            state.entry.is_some() || state.flight.is_some()
        });
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
