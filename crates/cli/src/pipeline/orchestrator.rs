//! Load-run orchestrator - starts the router and feeds it generated messages.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;
use contracts::RouterBlueprint;
use observability::DeliveryAggregator;
use router::RouterContext;
use tracing::{info, warn};

use super::{MessageGenerator, RunStats};
use crate::error::CliError;

/// Load-run configuration
#[derive(Debug, Clone)]
pub struct LoadRunConfig {
    /// Router configuration, CLI overrides applied
    pub blueprint: RouterBlueprint,

    /// Message source
    pub generator: MessageGenerator,

    /// Stop generating after this long (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// One router lifetime: start, generate, drain
pub struct LoadRun {
    config: LoadRunConfig,
}

impl LoadRun {
    pub fn new(config: LoadRunConfig) -> Self {
        Self { config }
    }

    /// Run to completion or until `shutdown` resolves
    ///
    /// A shutdown stops generation and skips the retry-queue grace period;
    /// running vendor calls still finish.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RunStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let context = RouterContext::from_blueprint(blueprint)
            .map_err(|e| CliError::router_startup(e.to_string()))?;
        let (router, mut reports) = context.start_with_reports();

        let aggregator = tokio::spawn(async move {
            let mut aggregator = DeliveryAggregator::new();
            while let Some(report) = reports.recv().await {
                aggregator.update(&report);
            }
            aggregator
        });

        let generator = &self.config.generator;
        info!(
            messages = generator.count(),
            mix = ?generator.mix(),
            "Generator started"
        );

        let sender = router.sender();
        let mut generated = 0u64;
        let produce = async {
            for message in generator.messages() {
                if sender.send(message).await.is_err() {
                    warn!("Router inbound channel closed");
                    break;
                }
                generated += 1;
            }
        };
        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        let interrupted = tokio::select! {
            _ = produce => false,
            _ = deadline => {
                warn!(timeout = ?self.config.timeout, "Generation timed out");
                true
            }
            _ = shutdown => {
                warn!("Received shutdown signal, stopping generation");
                true
            }
        };
        drop(sender);

        info!(generated, interrupted, "Generator ended");

        let report = if interrupted {
            router.shutdown().await
        } else {
            router.drain(blueprint.router.drain_timeout()).await
        };

        let deliveries = match aggregator.await {
            Ok(aggregator) => aggregator.summary(),
            Err(e) => {
                warn!(error = ?e, "Delivery aggregation task failed");
                DeliveryAggregator::new().summary()
            }
        };

        let stats = RunStats {
            generated,
            duration: start_time.elapsed(),
            interrupted,
            router: report,
            deliveries,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            throughput = format!("{:.2}", stats.throughput()),
            "Load run complete"
        );

        Ok(stats)
    }
}
