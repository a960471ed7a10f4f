// Live engine statistics — cache hit rates, evictions, frames served.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_evictions: u64,
    pub decode_failures: u64,
    pub frames_served: u64,
    pub placeholders_served: u64,
    pub suppressed: u64,
    pub cache_hit_rate: f64,
    pub uptime_secs: u64,
}

pub struct StatsCollector {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_evictions: AtomicU64,
    decode_failures: AtomicU64,
    frames_served: AtomicU64,
    placeholders_served: AtomicU64,
    suppressed: AtomicU64,
    started: Instant,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            cache_evictions: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            frames_served: AtomicU64::new(0),
            placeholders_served: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.cache_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.frames_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_placeholder(&self) {
        self.placeholders_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);
        let lookups = cache_hits + cache_misses;
        let cache_hit_rate = if lookups > 0 {
            cache_hits as f64 / lookups as f64
        } else {
            0.0
        };

        StatsSnapshot {
            cache_hits,
            cache_misses,
            cache_evictions: self.cache_evictions.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            frames_served: self.frames_served.load(Ordering::Relaxed),
            placeholders_served: self.placeholders_served.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            cache_hit_rate,
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
