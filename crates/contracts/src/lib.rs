//! # Contracts
//!
//! Shared interface contracts for the vendor router.
//! Every business crate depends on this crate; it depends on none of them.
//!
//! ## Routing model
//! - A `Message` carries a `MessageType`, which selects an ordered vendor preference list
//! - Vendors are described by `VendorSpec` and own a fixed sending budget
//! - Delivery goes through the `VendorTransport` seam and reduces to success/failure plus latency

mod blueprint;
mod delivery;
mod error;
mod message;
mod transport;
mod vendor;

pub use blueprint::*;
pub use delivery::*;
pub use error::*;
pub use message::*;
pub use transport::{LocalVendorTransport, VendorTransport};
pub use vendor::*;
