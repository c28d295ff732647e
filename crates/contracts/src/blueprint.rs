//! RouterBlueprint - Config Loader output
//!
//! Describes the full router configuration: runtime tuning, transport,
//! vendors and per-message-type preference lists.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{MessageType, VendorSpec};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete router configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Runtime tuning
    #[serde(default)]
    pub router: RouterSettings,

    /// Vendor transport selection
    #[serde(default)]
    pub transport: TransportConfig,

    /// Vendor definitions
    pub vendors: Vec<VendorSpec>,

    /// Message type -> ordered vendor candidates
    #[serde(default)]
    pub preferences: Vec<PreferenceConfig>,
}

impl RouterBlueprint {
    /// Find a vendor spec by name
    pub fn vendor(&self, name: &str) -> Option<&VendorSpec> {
        self.vendors.iter().find(|v| v.name == name)
    }

    /// Find the preference list for a message type
    pub fn preference(&self, message_type: MessageType) -> Option<&PreferenceConfig> {
        self.preferences
            .iter()
            .find(|p| p.message_type == message_type)
    }
}

/// Router runtime tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Inbound channel capacity
    #[serde(default = "default_inbound_capacity")]
    pub inbound_capacity: usize,

    /// Sleep between selection attempts for a queued message (ms)
    #[serde(default = "default_retry_poll_interval_ms")]
    pub retry_poll_interval_ms: u64,

    /// Retry workers per message type shard
    #[serde(default = "default_retry_workers_per_type")]
    pub retry_workers_per_type: usize,

    /// Upper bound on a single vendor call (ms)
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,

    /// Grace period for draining queued and in-flight messages on shutdown (ms)
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

fn default_inbound_capacity() -> usize {
    1024
}

fn default_retry_poll_interval_ms() -> u64 {
    10
}

fn default_retry_workers_per_type() -> usize {
    1
}

fn default_delivery_timeout_ms() -> u64 {
    5000
}

fn default_drain_timeout_ms() -> u64 {
    30_000
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            inbound_capacity: default_inbound_capacity(),
            retry_poll_interval_ms: default_retry_poll_interval_ms(),
            retry_workers_per_type: default_retry_workers_per_type(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

impl RouterSettings {
    pub fn retry_poll_interval(&self) -> Duration {
        Duration::from_millis(self.retry_poll_interval_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

/// Vendor transport selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// HTTP GET against the vendor locator
    Http {
        #[serde(default = "default_connect_timeout_ms")]
        connect_timeout_ms: u64,
    },
    /// Log only, every call succeeds
    Log,
    /// In-process simulated vendor
    Mock {
        /// Simulated call latency (ms)
        #[serde(default)]
        latency_ms: u64,
        /// Fail every n-th call (0 = never)
        #[serde(default)]
        fail_every: u64,
    },
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Http {
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl TransportConfig {
    /// Short name used in logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Log => "log",
            Self::Mock { .. } => "mock",
        }
    }
}

/// Preference list for one message type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceConfig {
    /// Message type this list applies to
    pub message_type: MessageType,

    /// Candidates in priority order
    pub candidates: Vec<CandidateConfig>,
}

/// One vendor candidate within a preference list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateConfig {
    /// Vendor name (must match a `VendorSpec::name`)
    pub vendor: String,

    /// Relative share, stored for reporting; selection is strictly ordered
    #[serde(default)]
    pub weight: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_default_is_http() {
        let bp: RouterBlueprint = serde_json::from_str(r#"{ "vendors": [] }"#).unwrap();
        assert_eq!(
            bp.transport,
            TransportConfig::Http {
                connect_timeout_ms: 1000
            }
        );
        assert_eq!(bp.router.retry_poll_interval_ms, 10);
        assert!(bp.preferences.is_empty());
    }

    #[test]
    fn test_transport_config_tagged() {
        let bp: RouterBlueprint = toml::from_str(
            r#"
vendors = []

[transport]
kind = "mock"
latency_ms = 3
"#,
        )
        .unwrap();
        assert_eq!(
            bp.transport,
            TransportConfig::Mock {
                latency_ms: 3,
                fail_every: 0
            }
        );
        assert_eq!(bp.transport.kind(), "mock");
    }
}
