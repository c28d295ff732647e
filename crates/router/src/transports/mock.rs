//! MockTransport - in-process vendor with injectable latency and failures

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{ContractError, Message, VendorSpec, VendorTransport};
use tracing::{debug, instrument};

/// Per-vendor call accounting
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VendorLoad {
    /// Calls currently running
    pub active: u64,
    /// Highest concurrent call count observed
    pub peak: u64,
    /// Calls started
    pub calls: u64,
}

/// Transport that answers locally
///
/// Every `fail_every`-th call fails (0 disables, 1 fails every call). Calls
/// sleep for `latency` before answering. Per-vendor load is tracked so tests
/// can check that a vendor never ran more calls than its budget allows.
#[derive(Debug, Default)]
pub struct MockTransport {
    latency: Duration,
    fail_every: u64,
    calls: AtomicU64,
    loads: Mutex<HashMap<String, VendorLoad>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fail_every(mut self, n: u64) -> Self {
        self.fail_every = n;
        self
    }

    /// Total calls started across all vendors
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Load figures for one vendor
    pub fn load(&self, vendor: &str) -> VendorLoad {
        self.loads().get(vendor).copied().unwrap_or_default()
    }

    fn loads(&self) -> MutexGuard<'_, HashMap<String, VendorLoad>> {
        self.loads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, vendor: &str) -> ActiveCall<'_> {
        let mut loads = self.loads();
        let load = loads.entry(vendor.to_string()).or_default();
        load.active += 1;
        load.calls += 1;
        load.peak = load.peak.max(load.active);
        ActiveCall {
            transport: self,
            vendor: vendor.to_string(),
        }
    }
}

/// Decrements the vendor's active count, also on cancellation
struct ActiveCall<'a> {
    transport: &'a MockTransport,
    vendor: String,
}

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        if let Some(load) = self.transport.loads().get_mut(&self.vendor) {
            load.active = load.active.saturating_sub(1);
        }
    }
}

impl VendorTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    #[instrument(
        name = "mock_transport_deliver",
        skip(self, vendor, message),
        fields(vendor = %vendor.name, message_id = message.id)
    )]
    async fn deliver(&self, vendor: &VendorSpec, message: &Message) -> Result<(), ContractError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let _active = self.enter(&vendor.name);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.fail_every > 0 && n % self.fail_every == 0 {
            debug!(call = n, "injected failure");
            return Err(ContractError::transport(&vendor.name, "injected failure"));
        }
        Ok(())
    }
}
