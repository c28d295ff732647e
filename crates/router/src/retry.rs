//! RetryQueue - per-message-type holding area for messages without capacity
//!
//! Each message type gets its own unbounded queue and a small pool of
//! workers. A worker holds one message at a time and re-runs selection every
//! poll interval until a vendor has room, so an exhausted type never delays
//! the others.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{Message, MessageType, RouterSettings, VendorTransport};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::error::RouterError;
use crate::executor::DeliveryExecutor;
use crate::metrics::RouterMetrics;
use crate::selector::VendorSelector;

/// Retry worker tuning
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Sleep between selection attempts while no vendor has capacity
    pub poll_interval: Duration,
    /// Workers sharing each message type's queue
    pub workers_per_type: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&RouterSettings::default())
    }
}

impl From<&RouterSettings> for RetryConfig {
    fn from(settings: &RouterSettings) -> Self {
        Self {
            poll_interval: settings.retry_poll_interval(),
            workers_per_type: settings.retry_workers_per_type.max(1),
        }
    }
}

/// A message parked for capacity
#[derive(Debug)]
struct Queued {
    message: Message,
    queued_at: Instant,
}

/// Counters shared by a shard's sender side and its workers
#[derive(Debug)]
struct ShardState {
    message_type: MessageType,
    /// Messages queued or held by a worker
    depth: AtomicUsize,
    /// Selection attempts made by the shard's workers
    attempts: AtomicU64,
}

impl ShardState {
    fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            depth: AtomicUsize::new(0),
            attempts: AtomicU64::new(0),
        }
    }

    fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    fn leave(&self, metrics: &RouterMetrics) {
        let depth = self.depth.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
        metrics.on_dequeued();
        observability::record_retry_depth(self.message_type, depth);
    }
}

#[derive(Debug, Clone)]
struct ShardSender {
    tx: async_channel::Sender<Queued>,
    state: Arc<ShardState>,
}

/// Enqueue side of the retry queue
///
/// Held by the dispatch pipeline. Once every clone is dropped the shards
/// close and workers exit after draining what is left.
#[derive(Debug, Clone)]
pub struct RetrySender {
    shards: BTreeMap<MessageType, ShardSender>,
    metrics: Arc<RouterMetrics>,
}

impl RetrySender {
    /// Park a message until a vendor has capacity (never blocks)
    ///
    /// # Errors
    /// `UnknownMessageType` when no shard exists for the type,
    /// `RetryQueueClosed` when the shard's workers are gone.
    pub fn enqueue(&self, message: Message) -> Result<(), RouterError> {
        let message_type = message.message_type;
        let shard = self
            .shards
            .get(&message_type)
            .ok_or(RouterError::UnknownMessageType { message_type })?;

        // Count before sending so a fast worker never sees the depth underflow.
        let depth = shard.state.depth.fetch_add(1, Ordering::AcqRel) + 1;
        self.metrics.on_enqueued();

        let queued = Queued {
            message,
            queued_at: Instant::now(),
        };
        if shard.tx.try_send(queued).is_err() {
            shard.state.depth.fetch_sub(1, Ordering::AcqRel);
            self.metrics.on_enqueue_failed();
            return Err(RouterError::RetryQueueClosed { message_type });
        }

        observability::record_retry_depth(message_type, depth);
        Ok(())
    }
}

/// Worker side of the retry queue
pub struct RetryQueue {
    shards: BTreeMap<MessageType, Arc<ShardState>>,
    shutdown: watch::Sender<bool>,
    workers: JoinSet<()>,
}

impl RetryQueue {
    /// Create one shard per message type in the selector's table and spawn
    /// its workers
    #[instrument(
        name = "retry_queue_spawn",
        skip_all,
        fields(workers_per_type = config.workers_per_type)
    )]
    pub fn spawn<T>(
        selector: VendorSelector,
        executor: DeliveryExecutor<T>,
        config: RetryConfig,
        metrics: Arc<RouterMetrics>,
    ) -> (Self, RetrySender)
    where
        T: VendorTransport + Sync + 'static,
    {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let mut workers = JoinSet::new();
        let mut shards = BTreeMap::new();
        let mut senders = BTreeMap::new();

        for message_type in selector.table().message_types() {
            let (tx, rx) = async_channel::unbounded();
            let state = Arc::new(ShardState::new(message_type));

            for index in 0..config.workers_per_type.max(1) {
                let worker = RetryWorker {
                    index,
                    state: Arc::clone(&state),
                    selector: selector.clone(),
                    executor: executor.clone(),
                    poll_interval: config.poll_interval,
                    metrics: Arc::clone(&metrics),
                    rx: rx.clone(),
                    shutdown: shutdown_rx.clone(),
                };
                workers.spawn(worker.run());
            }

            shards.insert(message_type, Arc::clone(&state));
            senders.insert(message_type, ShardSender { tx, state });
        }

        debug!(shards = shards.len(), workers = workers.len(), "Retry queue started");

        let queue = Self {
            shards,
            shutdown,
            workers,
        };
        let sender = RetrySender {
            shards: senders,
            metrics,
        };
        (queue, sender)
    }

    /// Messages waiting for capacity for one type
    pub fn depth(&self, message_type: MessageType) -> usize {
        self.shards
            .get(&message_type)
            .map_or(0, |state| state.depth())
    }

    /// Messages waiting across all types
    pub fn total_depth(&self) -> usize {
        self.shards.values().map(|state| state.depth()).sum()
    }

    /// Selection attempts made so far for one type
    pub fn attempts(&self, message_type: MessageType) -> u64 {
        self.shards
            .get(&message_type)
            .map_or(0, |state| state.attempts.load(Ordering::Relaxed))
    }

    /// Workers still running
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait for workers to exit
    ///
    /// Workers exit once every `RetrySender` is dropped and their shard is
    /// empty, or after `shutdown`. Cancel-safe, so it can sit under a
    /// timeout.
    pub async fn wait_drained(&mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                error!(error = ?e, "Retry worker panicked");
            }
        }
    }

    /// Ask workers to stop at their next poll boundary
    ///
    /// Messages still queued are counted as abandoned.
    pub fn signal_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Stop workers and wait for them
    #[instrument(name = "retry_queue_shutdown", skip(self))]
    pub async fn shutdown(mut self) {
        self.signal_shutdown();
        self.wait_drained().await;
        info!("Retry queue shutdown complete");
    }
}

/// Resolves once shutdown is requested or the signal owner is gone
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

enum Placement {
    Dispatched,
    Rejected,
    Stopped(Queued),
}

struct RetryWorker<T> {
    index: usize,
    state: Arc<ShardState>,
    selector: VendorSelector,
    executor: DeliveryExecutor<T>,
    poll_interval: Duration,
    metrics: Arc<RouterMetrics>,
    rx: async_channel::Receiver<Queued>,
    shutdown: watch::Receiver<bool>,
}

impl<T> RetryWorker<T>
where
    T: VendorTransport + Sync + 'static,
{
    #[instrument(
        name = "retry_worker",
        skip(self),
        fields(message_type = %self.state.message_type, worker = self.index)
    )]
    async fn run(mut self) {
        debug!("Retry worker started");

        let mut abandoned = 0u64;
        loop {
            let queued = tokio::select! {
                biased;
                _ = stop_requested(&mut self.shutdown) => break,
                next = self.rx.recv() => match next {
                    Ok(queued) => queued,
                    // Closed and empty
                    Err(_) => break,
                },
            };

            match self.place(queued).await {
                Placement::Dispatched | Placement::Rejected => {}
                Placement::Stopped(queued) => {
                    self.abandon(&queued);
                    abandoned += 1;
                    break;
                }
            }
        }

        // Refuse new work first so nothing lands after the final sweep.
        self.rx.close();
        while let Ok(queued) = self.rx.try_recv() {
            self.abandon(&queued);
            abandoned += 1;
        }

        if abandoned > 0 {
            warn!(abandoned, "Retry worker stopped with queued messages");
        }
        debug!("Retry worker stopped");
    }

    /// Re-run selection until a vendor has room or shutdown is requested
    async fn place(&mut self, queued: Queued) -> Placement {
        let message_type = queued.message.message_type;
        let mut attempts = 0u64;

        loop {
            attempts += 1;
            self.state.attempts.fetch_add(1, Ordering::Relaxed);

            match self.selector.select(&queued.message) {
                Ok(Some(reservation)) => {
                    self.state.leave(&self.metrics);
                    self.metrics.inc_retry_dispatched();
                    observability::record_disposition(message_type, "retry_dispatched");
                    observability::record_retry_wait(
                        message_type,
                        attempts,
                        queued.queued_at.elapsed(),
                    );
                    debug!(
                        message_id = queued.message.id,
                        vendor = %reservation.vendor().name(),
                        attempts,
                        "Queued message dispatched"
                    );
                    self.executor.launch(queued.message, reservation, true);
                    return Placement::Dispatched;
                }
                Ok(None) => {}
                Err(e) => {
                    self.state.leave(&self.metrics);
                    self.metrics.inc_rejected();
                    observability::record_disposition(message_type, "rejected");
                    error!(message_id = queued.message.id, error = %e, "Queued message rejected");
                    return Placement::Rejected;
                }
            }

            tokio::select! {
                biased;
                _ = stop_requested(&mut self.shutdown) => return Placement::Stopped(queued),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    fn abandon(&self, queued: &Queued) {
        self.state.leave(&self.metrics);
        self.metrics.inc_abandoned();
        observability::record_disposition(queued.message.message_type, "abandoned");
        debug!(
            message_id = queued.message.id,
            waited_ms = queued.queued_at.elapsed().as_millis() as u64,
            "Queued message abandoned"
        );
    }
}
