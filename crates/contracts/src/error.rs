//! Layered error definitions
//!
//! Categorized by source: config / transport

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Vendor call could not be completed (connect, IO, protocol)
    #[error("vendor '{vendor}' transport error: {message}")]
    Transport { vendor: String, message: String },

    /// Vendor answered with a non-success status
    #[error("vendor '{vendor}' rejected message: status {status}")]
    VendorRejected { vendor: String, status: u16 },

    /// Transport could not be constructed
    #[error("transport setup error: {message}")]
    TransportSetup { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(vendor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            vendor: vendor.into(),
            message: message.into(),
        }
    }

    /// Create vendor rejection error
    pub fn vendor_rejected(vendor: impl Into<String>, status: u16) -> Self {
        Self::VendorRejected {
            vendor: vendor.into(),
            status,
        }
    }

    /// Create transport setup error
    pub fn transport_setup(message: impl Into<String>) -> Self {
        Self::TransportSetup {
            message: message.into(),
        }
    }
}
