//! Profiling sink: named intervals and monotonic counters.
//!
//! The sink is an explicit collaborator injected into the engine at
//! construction — its lifetime is managed by the surrounding pipeline,
//! not the engine. `NullProfiler` discards everything; `MemoryProfiler`
//! records in memory for tests and post-run inspection.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Receiver for engine timing and throughput metrics.
pub trait Profiler: Send + Sync {
    /// Record a named wall-clock interval.
    fn add_interval(&self, name: &str, start: Instant, end: Instant);

    /// Increment a named monotonic counter by `delta`.
    fn increment(&self, name: &str, delta: u64);
}

/// Discards all metrics.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullProfiler;

impl Profiler for NullProfiler {
    fn add_interval(&self, _name: &str, _start: Instant, _end: Instant) {}
    fn increment(&self, _name: &str, _delta: u64) {}
}

/// A recorded interval.
#[derive(Clone, Debug)]
pub struct IntervalRecord {
    pub name: String,
    pub start: Instant,
    pub end: Instant,
}

impl IntervalRecord {
    pub fn duration(&self) -> Duration {
        self.end.duration_since(self.start)
    }
}

/// In-memory recording sink.
#[derive(Debug, Default)]
pub struct MemoryProfiler {
    intervals: Mutex<Vec<IntervalRecord>>,
    counters: Mutex<HashMap<String, u64>>,
}

impl MemoryProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter (0 if never incremented).
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    /// Snapshot of all recorded intervals.
    pub fn intervals(&self) -> Vec<IntervalRecord> {
        self.intervals.lock().clone()
    }

    /// Number of recorded intervals with the given name.
    pub fn interval_count(&self, name: &str) -> usize {
        self.intervals.lock().iter().filter(|i| i.name == name).count()
    }
}

impl Profiler for MemoryProfiler {
    fn add_interval(&self, name: &str, start: Instant, end: Instant) {
        self.intervals.lock().push(IntervalRecord {
            name: name.to_string(),
            start,
            end,
        });
    }

    fn increment(&self, name: &str, delta: u64) {
        *self.counters.lock().entry(name.to_string()).or_insert(0) += delta;
    }
}
