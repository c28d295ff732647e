//! RouterContext - wires ledger, preferences, transport and workers together

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    DeliveryReport, Message, MessageType, RouterBlueprint, RouterSettings, VendorTransport,
};
use ledger::{BudgetLedger, VendorUsage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::dispatch::{DispatchPipeline, DispatchStats};
use crate::error::RouterError;
use crate::executor::DeliveryExecutor;
use crate::metrics::{RouterMetrics, RouterMetricsSnapshot};
use crate::preference::PreferenceTable;
use crate::retry::{RetryConfig, RetryQueue};
use crate::selector::VendorSelector;
use crate::transports::AnyTransport;

/// Everything the router needs, built once at startup
pub struct RouterContext<T> {
    settings: RouterSettings,
    ledger: Arc<BudgetLedger>,
    table: Arc<PreferenceTable>,
    transport: Arc<T>,
    metrics: Arc<RouterMetrics>,
}

impl RouterContext<AnyTransport> {
    /// Build the context with the transport named in `[transport]`
    ///
    /// # Errors
    /// Duplicate vendors, preferences naming unknown vendors, or a transport
    /// that cannot be constructed.
    pub fn from_blueprint(blueprint: &RouterBlueprint) -> Result<Self, RouterError> {
        let transport = AnyTransport::from_config(&blueprint.transport)?;
        Self::with_transport(blueprint, Arc::new(transport))
    }
}

impl<T> RouterContext<T>
where
    T: VendorTransport + Sync + 'static,
{
    /// Build the context around a caller-supplied transport
    pub fn with_transport(
        blueprint: &RouterBlueprint,
        transport: Arc<T>,
    ) -> Result<Self, RouterError> {
        let ledger = BudgetLedger::from_specs(&blueprint.vendors)?;
        let table = PreferenceTable::build(&blueprint.preferences, &ledger)?;

        for vendor in ledger.vendors() {
            observability::record_vendor_utilization(vendor.name(), 0, vendor.budget());
        }

        Ok(Self {
            settings: blueprint.router.clone(),
            ledger: Arc::new(ledger),
            table: Arc::new(table),
            transport,
            metrics: Arc::new(RouterMetrics::new()),
        })
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &Arc<BudgetLedger> {
        &self.ledger
    }

    pub fn table(&self) -> &Arc<PreferenceTable> {
        &self.table
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Start the pipeline and retry workers
    pub fn start(self) -> RouterHandle<T> {
        self.start_inner(None)
    }

    /// Start, publishing a `DeliveryReport` for every vendor call
    pub fn start_with_reports(self) -> (RouterHandle<T>, mpsc::UnboundedReceiver<DeliveryReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.start_inner(Some(tx)), rx)
    }

    #[instrument(
        name = "router_start",
        skip_all,
        fields(vendors = self.ledger.vendors().len(), message_types = self.table.len())
    )]
    fn start_inner(
        self,
        reports: Option<mpsc::UnboundedSender<DeliveryReport>>,
    ) -> RouterHandle<T> {
        let mut executor = DeliveryExecutor::new(
            Arc::clone(&self.transport),
            self.settings.delivery_timeout(),
            Arc::clone(&self.metrics),
        );
        if let Some(reports) = reports {
            executor = executor.with_reports(reports);
        }

        let selector = VendorSelector::new(Arc::clone(&self.table));
        let (retry, retry_tx) = RetryQueue::spawn(
            selector.clone(),
            executor.clone(),
            RetryConfig::from(&self.settings),
            Arc::clone(&self.metrics),
        );

        let (sender, input_rx) = mpsc::channel(self.settings.inbound_capacity.max(1));
        let pipeline = DispatchPipeline::new(
            selector,
            executor.clone(),
            retry_tx,
            Arc::clone(&self.metrics),
            input_rx,
        )
        .spawn();

        info!(
            transport = self.transport.name(),
            inbound_capacity = self.settings.inbound_capacity,
            poll_interval_ms = self.settings.retry_poll_interval_ms,
            "Router started"
        );

        RouterHandle {
            sender,
            pipeline,
            retry,
            executor,
            ledger: self.ledger,
            metrics: self.metrics,
        }
    }
}

/// Final numbers once the router has stopped
#[derive(Debug, Clone)]
pub struct RouterReport {
    pub dispatch: DispatchStats,
    pub metrics: RouterMetricsSnapshot,
    pub vendors: Vec<VendorUsage>,
    /// Whether the retry queue emptied within the grace period
    pub drained: bool,
}

/// Running router
pub struct RouterHandle<T> {
    sender: mpsc::Sender<Message>,
    pipeline: JoinHandle<DispatchStats>,
    retry: RetryQueue,
    executor: DeliveryExecutor<T>,
    ledger: Arc<BudgetLedger>,
    metrics: Arc<RouterMetrics>,
}

impl<T> RouterHandle<T>
where
    T: VendorTransport + Sync + 'static,
{
    /// Inbound side; clones must be dropped before `drain` can finish
    pub fn sender(&self) -> mpsc::Sender<Message> {
        self.sender.clone()
    }

    pub fn metrics(&self) -> &Arc<RouterMetrics> {
        &self.metrics
    }

    pub fn ledger(&self) -> &Arc<BudgetLedger> {
        &self.ledger
    }

    /// Messages waiting for capacity for one type
    pub fn retry_depth(&self, message_type: MessageType) -> usize {
        self.retry.depth(message_type)
    }

    /// Delivery tasks still running
    pub fn in_flight(&self) -> usize {
        self.executor.in_flight()
    }

    /// Stop accepting input and let queued work finish
    ///
    /// Waits for the pipeline to consume what is buffered, gives the retry
    /// queue `grace` to empty, abandons whatever is still queued after that,
    /// and finally waits for running vendor calls.
    #[instrument(name = "router_drain", skip(self), fields(grace_ms = grace.as_millis() as u64))]
    pub async fn drain(mut self, grace: Duration) -> RouterReport {
        drop(self.sender);

        let dispatch = match self.pipeline.await {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = ?e, "Dispatch pipeline panicked");
                DispatchStats::default()
            }
        };

        let drained = tokio::time::timeout(grace, self.retry.wait_drained())
            .await
            .is_ok();
        if !drained {
            warn!(
                remaining = self.retry.total_depth(),
                "Retry queue not empty after grace period, abandoning"
            );
            self.retry.signal_shutdown();
            self.retry.wait_drained().await;
        }

        self.executor.wait_idle().await;

        let report = RouterReport {
            dispatch,
            metrics: self.metrics.snapshot(),
            vendors: self.ledger.snapshot(),
            drained,
        };
        info!(
            received = report.metrics.received,
            delivered = report.metrics.delivered,
            abandoned = report.metrics.abandoned,
            drained,
            "Router stopped"
        );
        report
    }

    /// Stop without waiting for queued messages
    pub async fn shutdown(self) -> RouterReport {
        self.drain(Duration::ZERO).await
    }
}
