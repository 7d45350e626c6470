//! Run counters and summaries

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for one processing run, cheap to clone and share across workers
#[derive(Clone, Default)]
pub struct RunCounters {
    inner: Arc<CountersInner>,
}

#[derive(Default)]
struct CountersInner {
    events: AtomicU64,
    skipped_no_vertex: AtomicU64,
    malformed_lines: AtomicU64,
    truncated_objects: AtomicU64,
    records_written: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event that reached a producer
    pub fn record_event(&self) {
        self.inner.events.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hepsel_events_total").increment(1);
    }

    /// Record an event whose reco columns were left empty
    pub fn record_skipped_no_vertex(&self) {
        self.inner.skipped_no_vertex.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an input line that could not be parsed or resolved
    pub fn record_malformed(&self) {
        self.inner.malformed_lines.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hepsel_events_skipped_total", "reason" => "malformed_input").increment(1);
    }

    pub fn record_truncated(&self, count: u64) {
        self.inner.truncated_objects.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_written(&self) {
        self.inner.records_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            events: self.inner.events.load(Ordering::Relaxed),
            skipped_no_vertex: self.inner.skipped_no_vertex.load(Ordering::Relaxed),
            malformed_lines: self.inner.malformed_lines.load(Ordering::Relaxed),
            truncated_objects: self.inner.truncated_objects.load(Ordering::Relaxed),
            records_written: self.inner.records_written.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RunCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub events: u64,
    pub skipped_no_vertex: u64,
    pub malformed_lines: u64,
    pub truncated_objects: u64,
    pub records_written: u64,
}

impl RunSummary {
    /// Fraction of events that had a primary vertex
    pub fn vertex_efficiency(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            (self.events - self.skipped_no_vertex) as f64 / self.events as f64
        }
    }
}
