//! Router metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::DeliveryStatus;

/// In-process router counters
///
/// Shared by the dispatch pipeline, retry workers and delivery tasks.
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Messages taken from the inbound channel
    received: AtomicU64,
    /// Messages dispatched on first selection
    dispatched: AtomicU64,
    /// Messages handed to the retry queue
    queued: AtomicU64,
    /// Queued messages later dispatched
    retry_dispatched: AtomicU64,
    /// Messages rejected for configuration errors
    rejected: AtomicU64,
    /// Queued messages dropped at shutdown
    abandoned: AtomicU64,
    /// Vendor calls that succeeded
    delivered: AtomicU64,
    /// Vendor calls that failed
    failed: AtomicU64,
    /// Vendor calls that hit the delivery timeout
    timed_out: AtomicU64,
    /// Messages waiting in retry shards
    retry_depth: AtomicUsize,
    /// Delivery tasks running
    in_flight: AtomicUsize,
}

impl RouterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_retry_dispatched(&self) {
        self.retry_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a message entering a retry shard
    pub fn on_enqueued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        self.retry_depth.fetch_add(1, Ordering::Relaxed);
    }

    /// Undo `on_enqueued` for a message the shard refused
    pub fn on_enqueue_failed(&self) {
        self.queued.fetch_sub(1, Ordering::Relaxed);
        self.retry_depth.fetch_sub(1, Ordering::Relaxed);
    }

    /// Count a message leaving a retry shard
    pub fn on_dequeued(&self) {
        self.retry_depth.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn on_delivery_started(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Delivery task gone, whatever the reason (finished, aborted)
    pub fn on_delivery_ended(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record the outcome of a vendor call
    pub fn record_status(&self, status: &DeliveryStatus) {
        let counter = match status {
            DeliveryStatus::Delivered => &self.delivered,
            DeliveryStatus::Failed { .. } => &self.failed,
            DeliveryStatus::TimedOut => &self.timed_out,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn retry_depth(&self) -> usize {
        self.retry_depth.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> RouterMetricsSnapshot {
        RouterMetricsSnapshot {
            received: self.received(),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            retry_dispatched: self.retry_dispatched.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            retry_depth: self.retry_depth(),
            in_flight: self.in_flight(),
        }
    }
}

/// Snapshot of router metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterMetricsSnapshot {
    pub received: u64,
    pub dispatched: u64,
    pub queued: u64,
    pub retry_dispatched: u64,
    pub rejected: u64,
    pub abandoned: u64,
    pub delivered: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub retry_depth: usize,
    pub in_flight: usize,
}

impl RouterMetricsSnapshot {
    /// Vendor calls that have completed, whatever the outcome
    pub fn completed(&self) -> u64 {
        self.delivered + self.failed + self.timed_out
    }
}
