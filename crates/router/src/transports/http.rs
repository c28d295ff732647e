//! HttpTransport - vendor calls over HTTP GET

use std::time::Duration;

use contracts::{ContractError, Message, VendorSpec, VendorTransport};
use reqwest::Client;
use tracing::{debug, instrument, warn};

/// Sends `GET {locator}{recipient}?text={text}` to the vendor
///
/// Any 2xx answer counts as delivered. Other statuses map to
/// `VendorRejected`, connection and IO problems to `Transport`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the shared HTTP client
    ///
    /// The overall call deadline is enforced by the delivery executor.
    pub fn new(connect_timeout: Duration) -> Result<Self, ContractError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ContractError::transport_setup(format!("http client: {}", e)))?;
        Ok(Self { client })
    }

    /// Target URL for one message
    pub fn url(vendor: &VendorSpec, message: &Message) -> String {
        format!("{}{}", vendor.locator, message.recipient)
    }
}

impl VendorTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(
        name = "http_transport_deliver",
        skip(self, vendor, message),
        fields(vendor = %vendor.name, message_id = message.id)
    )]
    async fn deliver(&self, vendor: &VendorSpec, message: &Message) -> Result<(), ContractError> {
        let url = Self::url(vendor, message);

        let response = self
            .client
            .get(&url)
            .query(&[("text", message.text.as_str())])
            .send()
            .await
            .map_err(|e| ContractError::transport(&vendor.name, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(url = %url, status = status.as_u16(), "Sent");
            Ok(())
        } else {
            warn!(url = %url, status = status.as_u16(), "Vendor rejected message");
            Err(ContractError::vendor_rejected(&vendor.name, status.as_u16()))
        }
    }
}
