//! # Ledger
//!
//! Per-vendor budget accounting.
//!
//! Responsibilities:
//! - Own the process-wide vendor registry (`Arc<Vendor>` handles)
//! - Grant reservations with a lock-free compare-and-swap loop
//! - Release every reservation exactly once (RAII `Reservation`)

mod counter;
mod error;
mod ledger;
mod reservation;
mod vendor;

pub use counter::BudgetCounter;
pub use error::LedgerError;
pub use ledger::{BudgetLedger, VendorUsage};
pub use reservation::Reservation;
pub use vendor::Vendor;
