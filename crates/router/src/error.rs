//! Router error types

use contracts::MessageType;
use thiserror::Error;

/// Router-specific errors
#[derive(Debug, Error)]
pub enum RouterError {
    /// Message type has no preference list (configuration defect, never retried)
    #[error("no preference list for message type '{message_type}'")]
    UnknownMessageType { message_type: MessageType },

    /// Preference list references a vendor the ledger does not know
    #[error("preference for '{message_type}' references unknown vendor '{vendor}'")]
    UnknownVendor {
        message_type: MessageType,
        vendor: String,
    },

    /// Two preference lists for the same message type
    #[error("duplicate preference list for message type '{message_type}'")]
    DuplicatePreference { message_type: MessageType },

    /// Retry shard is gone (router shutting down)
    #[error("retry queue for '{message_type}' is closed")]
    RetryQueueClosed { message_type: MessageType },

    /// Vendor registry error
    #[error("ledger error: {0}")]
    Ledger(#[from] ledger::LedgerError),

    /// Contract error (config, transport setup)
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl RouterError {
    /// Create an unknown vendor error
    pub fn unknown_vendor(message_type: MessageType, vendor: impl Into<String>) -> Self {
        Self::UnknownVendor {
            message_type,
            vendor: vendor.into(),
        }
    }

    /// Whether this error is a configuration defect
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMessageType { .. }
                | Self::UnknownVendor { .. }
                | Self::DuplicatePreference { .. }
                | Self::Ledger(_)
        )
    }
}
