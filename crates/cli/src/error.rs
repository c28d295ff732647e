//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Unrecognized entry in `--mix`
    #[error("Invalid message mix entry '{entry}': {message}")]
    InvalidMix { entry: String, message: String },

    /// Router could not be built from the configuration
    #[error("Failed to start router: {message}")]
    RouterStartup { message: String },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn invalid_mix(entry: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMix {
            entry: entry.into(),
            message: message.into(),
        }
    }

    pub fn router_startup(message: impl Into<String>) -> Self {
        Self::RouterStartup {
            message: message.into(),
        }
    }
}

/// Fail early when the configuration path does not exist
pub fn ensure_config_exists(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::config_not_found(path))
    }
}
