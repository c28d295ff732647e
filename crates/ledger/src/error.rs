//! Ledger error types

use contracts::VendorId;
use thiserror::Error;

/// Errors raised while building the vendor registry
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Two vendors share a name
    #[error("duplicate vendor name '{name}'")]
    DuplicateName { name: String },

    /// Two vendors share an id
    #[error("duplicate vendor id {id}")]
    DuplicateId { id: VendorId },
}
