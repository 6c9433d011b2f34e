//! Atomic counters for runtime observability.
//!
//! All counters use relaxed ordering; they are diagnostic, not
//! synchronization primitives.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Global allocation and access counters.
pub struct MembraneMetrics {
    /// Regions created (malloc, calloc, realloc, string copies).
    pub allocations: AtomicU64,
    /// Regions released through their base address.
    pub frees: AtomicU64,
    /// Frees of addresses that belong to no region.
    pub foreign_frees: AtomicU64,
    /// Frees or reallocs of an address inside a region but not its base.
    pub interior_frees: AtomicU64,
    /// Successful reallocs.
    pub reallocs: AtomicU64,
    /// Span bytes currently live.
    pub live_bytes: AtomicU64,
    /// Released regions whose pad bytes had been written.
    pub pad_writes: AtomicU64,
    /// Accesses that fell outside every padded buffer.
    pub faults: AtomicU64,
}

impl MembraneMetrics {
    /// Create a new zeroed metrics instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allocations: AtomicU64::new(0),
            frees: AtomicU64::new(0),
            foreign_frees: AtomicU64::new(0),
            interior_frees: AtomicU64::new(0),
            reallocs: AtomicU64::new(0),
            live_bytes: AtomicU64::new(0),
            pad_writes: AtomicU64::new(0),
            faults: AtomicU64::new(0),
        }
    }

    /// Increment a counter by 1.
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read a counter value.
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            allocations: Self::get(&self.allocations),
            frees: Self::get(&self.frees),
            foreign_frees: Self::get(&self.foreign_frees),
            interior_frees: Self::get(&self.interior_frees),
            reallocs: Self::get(&self.reallocs),
            live_bytes: Self::get(&self.live_bytes),
            pad_writes: Self::get(&self.pad_writes),
            faults: Self::get(&self.faults),
        }
    }
}

impl Default for MembraneMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub allocations: u64,
    pub frees: u64,
    pub foreign_frees: u64,
    pub interior_frees: u64,
    pub reallocs: u64,
    pub live_bytes: u64,
    pub pad_writes: u64,
    pub faults: u64,
}

static GLOBAL_METRICS: MembraneMetrics = MembraneMetrics::new();

/// The process-wide counters.
#[must_use]
pub fn global_metrics() -> &'static MembraneMetrics {
    &GLOBAL_METRICS
}
