//! Vendor identity and budget description

use serde::{Deserialize, Serialize};

/// Vendor identifier
pub type VendorId = u32;

/// Static description of a delivery vendor
///
/// The mutable utilization counter lives in the ledger, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSpec {
    /// Unique numeric identifier
    pub id: VendorId,

    /// Unique name, referenced by preference lists
    pub name: String,

    /// Maximum concurrently outstanding reservations
    pub budget: u64,

    /// Network locator (base URL for the HTTP transport)
    pub locator: String,
}

impl VendorSpec {
    /// Create a vendor spec
    pub fn new(
        id: VendorId,
        name: impl Into<String>,
        budget: u64,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            budget,
            locator: locator.into(),
        }
    }
}
