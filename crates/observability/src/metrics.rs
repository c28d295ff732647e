//! Router metric recording
//!
//! Thin wrappers over the `metrics` facade plus an in-memory delivery
//! aggregator used for the end-of-run summary.

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{DeliveryReport, MessageType};
use metrics::{counter, gauge, histogram};

/// Record a message taken from the inbound stream
pub fn record_message_received(message_type: MessageType) {
    counter!(
        "blaster_messages_received_total",
        "message_type" => message_type.as_str()
    )
    .increment(1);
}

/// Record where a message went
///
/// `disposition` is one of `dispatched`, `queued`, `retry_dispatched`,
/// `rejected`, `abandoned`.
pub fn record_disposition(message_type: MessageType, disposition: &'static str) {
    counter!(
        "blaster_message_dispositions_total",
        "message_type" => message_type.as_str(),
        "disposition" => disposition
    )
    .increment(1);
}

/// Record a finished vendor call
pub fn record_delivery(report: &DeliveryReport) {
    counter!(
        "blaster_deliveries_total",
        "vendor" => report.vendor.clone(),
        "status" => report.status.label()
    )
    .increment(1);

    histogram!(
        "blaster_delivery_latency_ms",
        "vendor" => report.vendor.clone()
    )
    .record(report.latency.as_secs_f64() * 1000.0);
}

/// Record a vendor's budget utilization
pub fn record_vendor_utilization(vendor: &str, utilized: u64, budget: u64) {
    gauge!("blaster_vendor_utilized", "vendor" => vendor.to_string()).set(utilized as f64);
    gauge!("blaster_vendor_budget", "vendor" => vendor.to_string()).set(budget as f64);
}

/// Record retry shard depth
pub fn record_retry_depth(message_type: MessageType, depth: usize) {
    gauge!(
        "blaster_retry_queue_depth",
        "message_type" => message_type.as_str()
    )
    .set(depth as f64);
}

/// Record how long a queued message waited and how many selections it took
pub fn record_retry_wait(message_type: MessageType, attempts: u64, waited: Duration) {
    histogram!(
        "blaster_retry_attempts",
        "message_type" => message_type.as_str()
    )
    .record(attempts as f64);
    histogram!(
        "blaster_retry_wait_ms",
        "message_type" => message_type.as_str()
    )
    .record(waited.as_secs_f64() * 1000.0);
}

/// Delivery report aggregator
///
/// Aggregates reports in memory for the run summary.
#[derive(Debug, Clone, Default)]
pub struct DeliveryAggregator {
    /// Total reports
    pub total: u64,

    /// Successful calls
    pub delivered: u64,

    /// Failed calls
    pub failed: u64,

    /// Timed-out calls
    pub timed_out: u64,

    /// Reports for messages that went through the retry queue
    pub via_retry: u64,

    /// Latency statistics (ms)
    pub latency_stats: RunningStats,

    /// Per-vendor call counts
    pub vendor_counts: BTreeMap<String, u64>,
}

impl DeliveryAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one report into the totals
    pub fn update(&mut self, report: &DeliveryReport) {
        use contracts::DeliveryStatus;

        self.total += 1;
        match report.status {
            DeliveryStatus::Delivered => self.delivered += 1,
            DeliveryStatus::Failed { .. } => self.failed += 1,
            DeliveryStatus::TimedOut => self.timed_out += 1,
        }
        if report.via_retry {
            self.via_retry += 1;
        }

        self.latency_stats.push(report.latency.as_secs_f64() * 1000.0);
        *self.vendor_counts.entry(report.vendor.clone()).or_insert(0) += 1;
    }

    /// Build a summary
    pub fn summary(&self) -> DeliverySummary {
        DeliverySummary {
            total: self.total,
            delivered: self.delivered,
            failed: self.failed,
            timed_out: self.timed_out,
            via_retry: self.via_retry,
            success_rate: if self.total > 0 {
                self.delivered as f64 / self.total as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            vendor_counts: self.vendor_counts.clone(),
        }
    }
}

/// Delivery summary
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub total: u64,
    pub delivered: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub via_retry: u64,
    pub success_rate: f64,
    pub latency_ms: StatsSummary,
    pub vendor_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Total attempts: {}", self.total)?;
        writeln!(f, "Delivered: {} ({:.2}%)", self.delivered, self.success_rate)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Timed out: {}", self.timed_out)?;
        writeln!(f, "Via retry queue: {}", self.via_retry)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.vendor_counts.is_empty() {
            writeln!(f, "Per vendor:")?;
            for (vendor, count) in &self.vendor_counts {
                writeln!(f, "  {}: {}", vendor, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
