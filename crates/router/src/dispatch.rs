//! DispatchPipeline - main loop routing inbound messages

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use contracts::{Message, VendorTransport};

use crate::executor::DeliveryExecutor;
use crate::metrics::RouterMetrics;
use crate::retry::RetrySender;
use crate::selector::VendorSelector;

/// What happened to one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// A vendor was reserved and the call launched
    Dispatched { vendor: String },
    /// No capacity; parked in the retry queue
    Queued,
    /// Configuration defect or closed retry queue; dropped
    Rejected { reason: String },
}

/// Totals returned when the pipeline stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub received: u64,
    pub dispatched: u64,
    pub queued: u64,
    pub rejected: u64,
}

impl DispatchStats {
    fn record(&mut self, disposition: &Disposition) {
        self.received += 1;
        match disposition {
            Disposition::Dispatched { .. } => self.dispatched += 1,
            Disposition::Queued => self.queued += 1,
            Disposition::Rejected { .. } => self.rejected += 1,
        }
    }
}

/// Consumes messages in arrival order and routes each one exactly once
pub struct DispatchPipeline<T> {
    selector: VendorSelector,
    executor: DeliveryExecutor<T>,
    retry: RetrySender,
    metrics: Arc<RouterMetrics>,
    input_rx: mpsc::Receiver<Message>,
}

impl<T> DispatchPipeline<T>
where
    T: VendorTransport + Sync + 'static,
{
    pub fn new(
        selector: VendorSelector,
        executor: DeliveryExecutor<T>,
        retry: RetrySender,
        metrics: Arc<RouterMetrics>,
        input_rx: mpsc::Receiver<Message>,
    ) -> Self {
        Self {
            selector,
            executor,
            retry,
            metrics,
            input_rx,
        }
    }

    /// Route one message
    ///
    /// Never retries selection itself: no capacity means the retry queue.
    pub fn route(&self, message: Message) -> Disposition {
        let message_type = message.message_type;
        self.metrics.inc_received();
        observability::record_message_received(message_type);

        let disposition = match self.selector.select(&message) {
            Ok(Some(reservation)) => {
                let vendor = reservation.vendor().name().to_string();
                self.executor.launch(message, reservation, false);
                self.metrics.inc_dispatched();
                Disposition::Dispatched { vendor }
            }
            Ok(None) => {
                let message_id = message.id;
                match self.retry.enqueue(message) {
                    Ok(()) => Disposition::Queued,
                    Err(e) => {
                        error!(message_id, error = %e, "Could not queue message");
                        self.metrics.inc_rejected();
                        Disposition::Rejected {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Err(e) => {
                error!(message_id = message.id, error = %e, "Message rejected");
                self.metrics.inc_rejected();
                Disposition::Rejected {
                    reason: e.to_string(),
                }
            }
        };

        let label = match &disposition {
            Disposition::Dispatched { .. } => "dispatched",
            Disposition::Queued => "queued",
            Disposition::Rejected { .. } => "rejected",
        };
        observability::record_disposition(message_type, label);

        disposition
    }

    /// Run the pipeline main loop
    ///
    /// Returns when every inbound sender is dropped. Dropping the pipeline's
    /// retry sender on return lets the retry workers drain and exit.
    #[instrument(name = "dispatch_pipeline_run", skip(self))]
    pub async fn run(mut self) -> DispatchStats {
        info!(
            message_types = self.selector.table().len(),
            "Dispatch pipeline started"
        );

        let mut stats = DispatchStats::default();

        while let Some(message) = self.input_rx.recv().await {
            let disposition = self.route(message);
            stats.record(&disposition);

            if stats.received.is_multiple_of(10_000) {
                debug!(
                    received = stats.received,
                    dispatched = stats.dispatched,
                    queued = stats.queued,
                    "Dispatch progress"
                );
            }
        }

        info!(
            received = stats.received,
            dispatched = stats.dispatched,
            queued = stats.queued,
            rejected = stats.rejected,
            "Dispatch input closed"
        );

        stats
    }

    /// Spawn the pipeline as a background task
    pub fn spawn(self) -> JoinHandle<DispatchStats> {
        tokio::spawn(self.run())
    }
}
