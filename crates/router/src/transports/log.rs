//! LogTransport - logs each vendor call via tracing

use contracts::{ContractError, Message, VendorSpec, VendorTransport};
use tracing::{info, instrument};

/// Transport that only logs; every call succeeds
#[derive(Debug, Default)]
pub struct LogTransport;

impl LogTransport {
    pub fn new() -> Self {
        Self
    }
}

impl VendorTransport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    #[instrument(
        name = "log_transport_deliver",
        skip(self, vendor, message),
        fields(vendor = %vendor.name, message_id = message.id)
    )]
    async fn deliver(&self, vendor: &VendorSpec, message: &Message) -> Result<(), ContractError> {
        info!(
            vendor = %vendor.name,
            locator = %vendor.locator,
            message_id = message.id,
            message_type = %message.message_type,
            recipient = %message.recipient,
            "Message delivered"
        );
        Ok(())
    }
}
