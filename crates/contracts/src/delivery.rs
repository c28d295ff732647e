//! Delivery outcome contracts

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::MessageType;

/// Final status of one vendor call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum DeliveryStatus {
    /// Vendor accepted the message
    Delivered,
    /// Vendor call failed or was rejected
    Failed { reason: String },
    /// Vendor call exceeded the delivery timeout
    TimedOut,
}

impl DeliveryStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Failed { .. } => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Report emitted once per delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Message sequence number
    pub message_id: u64,

    /// Message routing tag
    pub message_type: MessageType,

    /// Vendor that carried the attempt
    pub vendor: String,

    /// Outcome
    pub status: DeliveryStatus,

    /// Wall-clock duration of the vendor call
    pub latency: Duration,

    /// Whether the message went through the retry queue first
    pub via_retry: bool,
}
