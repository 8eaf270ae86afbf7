//! function::instrument — cache, call counters and evaluation history.
//!
//! Purpose
//! -------
//! Provide the per-core observability layer every evaluation / gradient /
//! Hessian call passes through: a bounded point→value memoization cache,
//! three monotonic call counters, and an append-only history of evaluated
//! points. None of this state is ever consulted for correctness; it exists
//! so callers can observe and budget the numeric work.
//!
//! Key behaviors
//! -------------
//! - The cache is keyed on the exact bit pattern of the input point,
//!   insertion-ordered, bounded, and evicts its oldest entry when full.
//!   Only direct evaluation results are cached, never derivatives.
//! - A cache hit increments the hit counter and skips both the call
//!   counter and the history log.
//! - Counters only ever grow; clearing the cache resets the hit counter,
//!   nothing resets the call counters.
//! - History entries `(point, active parameter)` are appended whole under
//!   a lock, so concurrent writers never produce torn entries; cross-thread
//!   ordering is unspecified.
//!
//! Invariants & assumptions
//! ------------------------
//! - All members are interior-mutable (`&self` API): counters are atomics,
//!   cache and history sit behind `parking_lot` mutexes, so many threads
//!   may share one instrumented core while it is structurally read-only.
//! - Cloning an instrumentation snapshot (for copy-on-write) yields fully
//!   independent state; peers never observe each other's updates after a
//!   clone.
//! - Cache insertion races resolve as last-write-wins; both candidate
//!   values are valid, nothing is ever partially written.
//!
//! Conventions
//! -----------
//! - This layer is best-effort and never raises out of the hot path; the
//!   only fallible surface is capacity reconfiguration.
use crate::function::{
    errors::{FuncError, FuncResult},
    types::{Point, Sample, DEFAULT_CACHE_CAPACITY},
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// One recorded evaluation: the input point and the parameter that was
/// active for the call (`None` for parameterless functions).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub input: Point,
    pub parameter: Option<Point>,
}

/// Exact bit-pattern key for a point. Distinguishes `-0.0` from `0.0`
/// and every NaN payload; "same point" means byte-identical input.
fn point_key(point: &Point) -> Vec<u64> {
    point.iter().map(|v| v.to_bits()).collect()
}

/// Bounded, insertion-ordered point→value store.
#[derive(Debug, Clone, Default)]
struct EvalCache {
    order: VecDeque<Vec<u64>>,
    map: HashMap<Vec<u64>, (Point, Point)>,
}

impl EvalCache {
    fn lookup(&self, point: &Point) -> Option<Point> {
        self.map.get(&point_key(point)).map(|(_, output)| output.clone())
    }

    fn insert(&mut self, point: &Point, output: Point, capacity: usize) {
        let key = point_key(point);
        if self.map.insert(key.clone(), (point.clone(), output)).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
    }

    fn clear(&mut self) {
        self.order.clear();
        self.map.clear();
    }
}

/// Per-core observability state: cache, counters, history.
#[derive(Debug)]
pub struct Instrumentation {
    cache_enabled: AtomicBool,
    history_enabled: AtomicBool,
    cache_capacity: AtomicU64,
    cache: Mutex<EvalCache>,
    history: Mutex<Vec<HistoryEntry>>,
    evaluation_calls: AtomicU64,
    gradient_calls: AtomicU64,
    hessian_calls: AtomicU64,
    cache_hits: AtomicU64,
}

impl Default for Instrumentation {
    fn default() -> Self {
        Self {
            cache_enabled: AtomicBool::new(false),
            history_enabled: AtomicBool::new(false),
            cache_capacity: AtomicU64::new(DEFAULT_CACHE_CAPACITY as u64),
            cache: Mutex::new(EvalCache::default()),
            history: Mutex::new(Vec::new()),
            evaluation_calls: AtomicU64::new(0),
            gradient_calls: AtomicU64::new(0),
            hessian_calls: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }
}

impl Clone for Instrumentation {
    /// Independent snapshot: flags, bounds, cache and history contents and
    /// counter values are copied; nothing stays shared.
    fn clone(&self) -> Self {
        Self {
            cache_enabled: AtomicBool::new(self.cache_enabled.load(Ordering::Relaxed)),
            history_enabled: AtomicBool::new(self.history_enabled.load(Ordering::Relaxed)),
            cache_capacity: AtomicU64::new(self.cache_capacity.load(Ordering::Relaxed)),
            cache: Mutex::new(self.cache.lock().clone()),
            history: Mutex::new(self.history.lock().clone()),
            evaluation_calls: AtomicU64::new(self.evaluation_calls.load(Ordering::Relaxed)),
            gradient_calls: AtomicU64::new(self.gradient_calls.load(Ordering::Relaxed)),
            hessian_calls: AtomicU64::new(self.hessian_calls.load(Ordering::Relaxed)),
            cache_hits: AtomicU64::new(self.cache_hits.load(Ordering::Relaxed)),
        }
    }
}

impl Instrumentation {
    // ---- Cache ----

    pub fn enable_cache(&self) {
        self.cache_enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable_cache(&self) {
        self.cache_enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled.load(Ordering::Relaxed)
    }

    /// Number of evaluations answered from the cache since the last clear.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Look a point up; counts a hit on success. Returns `None` when the
    /// cache is disabled or the point was never stored.
    pub fn cache_lookup(&self, point: &Point) -> Option<Point> {
        if !self.is_cache_enabled() {
            return None;
        }
        let found = self.cache.lock().lookup(point);
        if found.is_some() {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("cache hit for point of dimension {}", point.len());
        }
        found
    }

    /// Store an evaluation result if caching is enabled.
    pub fn cache_insert(&self, point: &Point, output: Point) {
        if !self.is_cache_enabled() {
            return;
        }
        let capacity = self.cache_capacity.load(Ordering::Relaxed) as usize;
        self.cache.lock().insert(point, output, capacity);
    }

    /// Pre-seed the cache with already-known (input, output) pairs,
    /// regardless of the enabled flag.
    pub fn add_cache_content(&self, inputs: &[Point], outputs: &[Point]) {
        let capacity = self.cache_capacity.load(Ordering::Relaxed) as usize;
        let mut cache = self.cache.lock();
        for (input, output) in inputs.iter().zip(outputs) {
            cache.insert(input, output.clone(), capacity);
        }
    }

    /// Cached input points, oldest first.
    pub fn cache_input(&self) -> Sample {
        let cache = self.cache.lock();
        cache
            .order
            .iter()
            .filter_map(|key| cache.map.get(key).map(|(input, _)| input.clone()))
            .collect()
    }

    /// Cached output points, in the same order as [`Self::cache_input`].
    pub fn cache_output(&self) -> Sample {
        let cache = self.cache.lock();
        cache
            .order
            .iter()
            .filter_map(|key| cache.map.get(key).map(|(_, output)| output.clone()))
            .collect()
    }

    /// Drop every cached entry and reset the hit counter.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        self.cache_hits.store(0, Ordering::Relaxed);
    }

    /// Rebound the cache; existing oldest entries are evicted if the new
    /// capacity is smaller.
    ///
    /// # Errors
    /// [`FuncError::InvalidCacheCapacity`] if `capacity == 0`.
    pub fn set_cache_capacity(&self, capacity: usize) -> FuncResult<()> {
        if capacity == 0 {
            return Err(FuncError::InvalidCacheCapacity { capacity });
        }
        self.cache_capacity.store(capacity as u64, Ordering::Relaxed);
        let mut cache = self.cache.lock();
        while cache.order.len() > capacity {
            if let Some(oldest) = cache.order.pop_front() {
                cache.map.remove(&oldest);
            }
        }
        Ok(())
    }

    /// Current cache bound, in entries.
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity.load(Ordering::Relaxed) as usize
    }

    // ---- History ----

    pub fn enable_history(&self) {
        self.history_enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable_history(&self) {
        self.history_enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_history_enabled(&self) -> bool {
        self.history_enabled.load(Ordering::Relaxed)
    }

    /// Append one entry if history is enabled. The entry is written whole
    /// under the lock.
    pub fn record_history(&self, input: &Point, parameter: Option<&Point>) {
        if !self.is_history_enabled() {
            return;
        }
        self.history
            .lock()
            .push(HistoryEntry { input: input.clone(), parameter: parameter.cloned() });
    }

    /// Snapshot of the recorded history, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().clone()
    }

    /// Explicitly drop the recorded history. Never happens implicitly.
    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    // ---- Counters ----

    pub fn record_evaluation_calls(&self, count: u64) {
        self.evaluation_calls.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_gradient_call(&self) {
        self.gradient_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hessian_call(&self) {
        self.hessian_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn evaluation_calls(&self) -> u64 {
        self.evaluation_calls.load(Ordering::Relaxed)
    }

    pub fn gradient_calls(&self) -> u64 {
        self.gradient_calls.load(Ordering::Relaxed)
    }

    pub fn hessian_calls(&self) -> u64 {
        self.hessian_calls.load(Ordering::Relaxed)
    }
}
