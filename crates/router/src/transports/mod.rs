//! Transport implementations
//!
//! Contains HttpTransport, LogTransport, and MockTransport, plus
//! `AnyTransport` for picking one from configuration.

mod http;
mod log;
mod mock;

use contracts::{ContractError, Message, TransportConfig, VendorSpec, VendorTransport};
use std::time::Duration;

pub use self::http::HttpTransport;
pub use self::log::LogTransport;
pub use self::mock::{MockTransport, VendorLoad};

/// Transport selected at startup from `[transport]`
#[derive(Debug)]
pub enum AnyTransport {
    Http(HttpTransport),
    Log(LogTransport),
    Mock(MockTransport),
}

impl AnyTransport {
    /// Build the configured transport
    ///
    /// # Errors
    /// `TransportSetup` when the HTTP client cannot be built.
    pub fn from_config(config: &TransportConfig) -> Result<Self, ContractError> {
        let transport = match config {
            TransportConfig::Http { connect_timeout_ms } => Self::Http(HttpTransport::new(
                Duration::from_millis(*connect_timeout_ms),
            )?),
            TransportConfig::Log => Self::Log(LogTransport::new()),
            TransportConfig::Mock {
                latency_ms,
                fail_every,
            } => Self::Mock(
                MockTransport::new()
                    .with_latency(Duration::from_millis(*latency_ms))
                    .fail_every(*fail_every),
            ),
        };
        Ok(transport)
    }
}

impl VendorTransport for AnyTransport {
    fn name(&self) -> &str {
        match self {
            Self::Http(t) => t.name(),
            Self::Log(t) => t.name(),
            Self::Mock(t) => t.name(),
        }
    }

    async fn deliver(&self, vendor: &VendorSpec, message: &Message) -> Result<(), ContractError> {
        match self {
            Self::Http(t) => t.deliver(vendor, message).await,
            Self::Log(t) => t.deliver(vendor, message).await,
            Self::Mock(t) => t.deliver(vendor, message).await,
        }
    }
}
