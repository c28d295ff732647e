//! VendorTransport trait - Delivery Executor output interface
//!
//! Defines the abstract vendor call. The router only consumes the
//! success/failure outcome; latency is measured by the caller.

use crate::{ContractError, Message, VendorSpec};

/// Vendor delivery trait
///
/// All transport implementations must implement this trait.
#[trait_variant::make(VendorTransport: Send)]
pub trait LocalVendorTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one message through the given vendor
    ///
    /// # Errors
    /// Returns a transport or rejection error (should include vendor context)
    async fn deliver(&self, vendor: &VendorSpec, message: &Message) -> Result<(), ContractError>;
}
