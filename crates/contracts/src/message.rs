//! Outbound message contracts
//!
//! A message is owned by exactly one stage at a time: producer, dispatch
//! pipeline, retry queue, delivery task.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message classification, selects the routing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// One-time password
    Otp,
    /// New match notification
    NewMatches,
    /// Accept notification
    Accept,
}

impl MessageType {
    /// All known message types, in declaration order
    pub const ALL: [MessageType; 3] = [Self::Otp, Self::NewMatches, Self::Accept];

    /// Stable snake_case name (matches the config spelling)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Otp => "otp",
            Self::NewMatches => "new_matches",
            Self::Accept => "accept",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "otp" => Ok(Self::Otp),
            "new_matches" | "new-matches" => Ok(Self::NewMatches),
            "accept" => Ok(Self::Accept),
            other => Err(format!("unknown message type '{other}'")),
        }
    }
}

/// Outbound message request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Producer-assigned sequence number (diagnostics only)
    pub id: u64,

    /// Routing tag
    pub message_type: MessageType,

    /// Payload text
    pub text: String,

    /// Recipient identifier (e.g. mobile number)
    pub recipient: String,
}

impl Message {
    /// Create a new message
    pub fn new(
        id: u64,
        message_type: MessageType,
        text: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            id,
            message_type,
            text: text.into(),
            recipient: recipient.into(),
        }
    }
}
