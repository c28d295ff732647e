//! # Router
//!
//! Budget-aware message routing.
//!
//! Responsibilities:
//! - Pick the first vendor with capacity from a message type's preference list
//! - Launch vendor calls without blocking the inbound stream
//! - Park messages without capacity and retry them per message type
//! - Return every reservation exactly once, whatever the call's outcome

pub mod context;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod preference;
pub mod retry;
pub mod selector;
pub mod transports;

pub use context::{RouterContext, RouterHandle, RouterReport};
pub use contracts::{Message, MessageType, VendorTransport};
pub use dispatch::{DispatchPipeline, DispatchStats, Disposition};
pub use error::RouterError;
pub use executor::DeliveryExecutor;
pub use metrics::{RouterMetrics, RouterMetricsSnapshot};
pub use preference::{PreferenceTable, VendorCandidate};
pub use retry::{RetryConfig, RetryQueue, RetrySender};
pub use selector::VendorSelector;
pub use transports::{AnyTransport, HttpTransport, LogTransport, MockTransport, VendorLoad};
