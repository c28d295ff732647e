//! DeliveryExecutor - runs vendor calls for reserved messages

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{DeliveryReport, DeliveryStatus, Message, VendorTransport};
use ledger::Reservation;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::metrics::RouterMetrics;

/// Launches one task per (message, reservation) pair
///
/// The reservation is released exactly once when the call finishes, fails,
/// times out, or the task is torn down.
pub struct DeliveryExecutor<T> {
    transport: Arc<T>,
    timeout: Duration,
    metrics: Arc<RouterMetrics>,
    reports: Option<mpsc::UnboundedSender<DeliveryReport>>,
    in_flight: Arc<InFlight>,
}

impl<T> Clone for DeliveryExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            timeout: self.timeout,
            metrics: Arc::clone(&self.metrics),
            reports: self.reports.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<T> DeliveryExecutor<T>
where
    T: VendorTransport + Sync + 'static,
{
    /// Create an executor with the given per-call timeout
    pub fn new(transport: Arc<T>, timeout: Duration, metrics: Arc<RouterMetrics>) -> Self {
        Self {
            transport,
            timeout,
            metrics,
            reports: None,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Publish a `DeliveryReport` for every finished call
    pub fn with_reports(mut self, reports: mpsc::UnboundedSender<DeliveryReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Number of delivery tasks still running
    pub fn in_flight(&self) -> usize {
        self.in_flight.count()
    }

    /// Spawn the vendor call (fire-and-continue)
    pub fn launch(
        &self,
        message: Message,
        reservation: Reservation,
        via_retry: bool,
    ) -> JoinHandle<DeliveryReport> {
        let guard = self.in_flight.enter(Arc::clone(&self.metrics));

        let executor = self.clone();
        tokio::spawn(async move {
            let report = executor.deliver(message, reservation, via_retry).await;
            executor.metrics.record_status(&report.status);
            observability::record_delivery(&report);
            if let Some(reports) = &executor.reports {
                // Receiver gone means nobody is listening any more.
                let _ = reports.send(report.clone());
            }
            drop(guard);
            report
        })
    }

    /// Wait until every launched call has finished
    pub async fn wait_idle(&self) {
        self.in_flight.wait_idle().await;
    }

    #[instrument(
        name = "delivery",
        skip(self, message, reservation),
        fields(message_id = message.id, vendor = %reservation.vendor().name())
    )]
    async fn deliver(
        &self,
        message: Message,
        reservation: Reservation,
        via_retry: bool,
    ) -> DeliveryReport {
        let vendor = Arc::clone(reservation.vendor());
        let start = Instant::now();

        let outcome = tokio::time::timeout(
            self.timeout,
            self.transport.deliver(vendor.spec(), &message),
        )
        .await;
        let latency = start.elapsed();

        reservation.release();
        observability::record_vendor_utilization(vendor.name(), vendor.utilized(), vendor.budget());

        let status = match outcome {
            Ok(Ok(())) => {
                debug!(latency_ms = latency.as_millis() as u64, "delivered");
                DeliveryStatus::Delivered
            }
            Ok(Err(e)) => {
                warn!(error = %e, latency_ms = latency.as_millis() as u64, "delivery failed");
                DeliveryStatus::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "delivery timed out"
                );
                DeliveryStatus::TimedOut
            }
        };

        DeliveryReport {
            message_id: message.id,
            message_type: message.message_type,
            vendor: vendor.name().to_string(),
            status,
            latency,
            via_retry,
        }
    }
}

/// Count of running delivery tasks with an idle notification
#[derive(Debug, Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn enter(self: &Arc<Self>, metrics: Arc<RouterMetrics>) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        metrics.on_delivery_started();
        InFlightGuard {
            in_flight: Arc::clone(self),
            metrics,
        }
    }

    fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

struct InFlightGuard {
    in_flight: Arc<InFlight>,
    metrics: Arc<RouterMetrics>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.metrics.on_delivery_ended();
        if self.in_flight.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.in_flight.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transports::MockTransport;
    use contracts::{MessageType, VendorSpec};
    use ledger::BudgetLedger;

    fn ledger(budget: u64) -> BudgetLedger {
        BudgetLedger::from_specs(&[VendorSpec::new(1, "ACL", budget, "http://127.0.0.1:8081/")])
            .unwrap()
    }

    fn msg(id: u64) -> Message {
        Message::new(id, MessageType::Otp, "hello", id.to_string())
    }

    #[tokio::test]
    async fn test_success_releases_reservation() {
        let ledger = ledger(1);
        let vendor = ledger.vendor("ACL").unwrap();
        let metrics = Arc::new(RouterMetrics::new());
        let executor = DeliveryExecutor::new(
            Arc::new(MockTransport::new()),
            Duration::from_secs(1),
            Arc::clone(&metrics),
        );

        let reservation = BudgetLedger::try_reserve(vendor).unwrap();
        assert_eq!(vendor.utilized(), 1);

        let report = executor.launch(msg(1), reservation, false).await.unwrap();
        assert_eq!(report.status, DeliveryStatus::Delivered);
        assert_eq!(report.vendor, "ACL");
        assert_eq!(vendor.utilized(), 0);
        assert_eq!(metrics.snapshot().delivered, 1);
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_releases_reservation() {
        let ledger = ledger(1);
        let vendor = ledger.vendor("ACL").unwrap();
        let metrics = Arc::new(RouterMetrics::new());
        let executor = DeliveryExecutor::new(
            Arc::new(MockTransport::new().fail_every(1)),
            Duration::from_secs(1),
            Arc::clone(&metrics),
        );

        let reservation = BudgetLedger::try_reserve(vendor).unwrap();
        let report = executor.launch(msg(1), reservation, false).await.unwrap();

        assert!(matches!(report.status, DeliveryStatus::Failed { .. }));
        assert_eq!(vendor.utilized(), 0);
        assert_eq!(metrics.snapshot().failed, 1);
    }

    #[tokio::test]
    async fn test_timeout_releases_reservation() {
        let ledger = ledger(1);
        let vendor = ledger.vendor("ACL").unwrap();
        let metrics = Arc::new(RouterMetrics::new());
        let executor = DeliveryExecutor::new(
            Arc::new(MockTransport::new().with_latency(Duration::from_secs(10))),
            Duration::from_millis(20),
            Arc::clone(&metrics),
        );

        let reservation = BudgetLedger::try_reserve(vendor).unwrap();
        let report = executor.launch(msg(1), reservation, true).await.unwrap();

        assert_eq!(report.status, DeliveryStatus::TimedOut);
        assert!(report.via_retry);
        assert_eq!(vendor.utilized(), 0);
        assert_eq!(metrics.snapshot().timed_out, 1);
    }

    #[tokio::test]
    async fn test_aborted_task_releases_reservation() {
        let ledger = ledger(1);
        let vendor = ledger.vendor("ACL").unwrap();
        let executor = DeliveryExecutor::new(
            Arc::new(MockTransport::new().with_latency(Duration::from_secs(10))),
            Duration::from_secs(30),
            Arc::new(RouterMetrics::new()),
        );

        let reservation = BudgetLedger::try_reserve(vendor).unwrap();
        let handle = executor.launch(msg(1), reservation, false);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(vendor.utilized(), 1);

        handle.abort();
        let _ = handle.await;
        assert_eq!(vendor.utilized(), 0);
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_reports_and_wait_idle() {
        let ledger = ledger(3);
        let vendor = ledger.vendor("ACL").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = DeliveryExecutor::new(
            Arc::new(MockTransport::new().with_latency(Duration::from_millis(10))),
            Duration::from_secs(1),
            Arc::new(RouterMetrics::new()),
        )
        .with_reports(tx);

        for id in 0..3 {
            let reservation = BudgetLedger::try_reserve(vendor).unwrap();
            executor.launch(msg(id), reservation, false);
        }
        assert_eq!(vendor.utilized(), 3);

        tokio::time::timeout(Duration::from_secs(2), executor.wait_idle())
            .await
            .expect("executor should go idle");
        assert_eq!(vendor.utilized(), 0);

        let mut ids = Vec::new();
        while let Ok(report) = rx.try_recv() {
            ids.push(report.message_id);
        }
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
