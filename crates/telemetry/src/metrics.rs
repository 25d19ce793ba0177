//! Internal metrics collection.
//!
//! Counters keyed by (APN, IMSI) mirror the per-subscriber accounting
//! series; everything else is a plain process-wide counter or gauge.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down, never below zero).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }
}

/// Counter family labeled by access point name and subscriber.
///
/// A series exists for every (APN, IMSI) pair ever seen and is kept for
/// the life of the process, like a labeled Prometheus counter.
#[derive(Debug, Default)]
pub struct LabeledCounter {
    series: RwLock<HashMap<(String, String), Counter>>,
}

impl LabeledCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, apn: &str, imsi: &str) {
        self.inc_by(apn, imsi, 1);
    }

    pub fn inc_by(&self, apn: &str, imsi: &str, n: u64) {
        let key = (apn.to_string(), imsi.to_string());
        if let Some(counter) = self.series.read().get(&key) {
            counter.inc_by(n);
            return;
        }
        self.series.write().entry(key).or_default().inc_by(n);
    }

    /// Value of one series; zero if it was never touched.
    pub fn get(&self, apn: &str, imsi: &str) -> u64 {
        self.series
            .read()
            .get(&(apn.to_string(), imsi.to_string()))
            .map(Counter::get)
            .unwrap_or(0)
    }

    /// Sum over all series.
    pub fn total(&self) -> u64 {
        self.series.read().values().map(Counter::get).sum()
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns (upper bound, count) per bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the accounting service.
#[derive(Debug, Default)]
pub struct Metrics {
    // Traffic, labeled (apn, imsi)
    pub octets_in: LabeledCounter,
    pub octets_out: LabeledCounter,

    // Terminations, labeled (apn, imsi)
    pub acct_stop: LabeledCounter,
    pub session_timeout: LabeledCounter,
    pub session_terminate: LabeledCounter,
    pub end_session: LabeledCounter,

    // Lifecycle calls
    pub acct_start: Counter,
    pub interim_updates: Counter,
    pub create_session_errors: Counter,
    pub flow_rollback_failures: Counter,
    pub sessions_recovered: Counter,
    pub sessions_recovery_failed: Counter,

    pub create_session_latency_ms: Histogram,

    pub active_sessions: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub octets_in: u64,
    pub octets_out: u64,
    pub acct_start: u64,
    pub interim_updates: u64,
    pub acct_stop: u64,
    pub session_timeout: u64,
    pub session_terminate: u64,
    pub end_session: u64,
    pub create_session_count: u64,
    pub create_session_latency_mean_ms: f64,
    pub create_session_errors: u64,
    pub flow_rollback_failures: u64,
    pub sessions_recovered: u64,
    pub sessions_recovery_failed: u64,
    pub active_sessions: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            octets_in: self.octets_in.total(),
            octets_out: self.octets_out.total(),
            acct_start: self.acct_start.get(),
            interim_updates: self.interim_updates.get(),
            acct_stop: self.acct_stop.total(),
            session_timeout: self.session_timeout.total(),
            session_terminate: self.session_terminate.total(),
            end_session: self.end_session.total(),
            create_session_count: self.create_session_latency_ms.count(),
            create_session_latency_mean_ms: self.create_session_latency_ms.mean(),
            create_session_errors: self.create_session_errors.get(),
            flow_rollback_failures: self.flow_rollback_failures.get(),
            sessions_recovered: self.sessions_recovered.get(),
            sessions_recovery_failed: self.sessions_recovery_failed.get(),
            active_sessions: self.active_sessions.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
