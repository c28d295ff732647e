//! Reservation - one held unit of a vendor budget

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::Vendor;

/// Hold on one unit of a vendor's budget
///
/// Only [`BudgetLedger::try_reserve`](crate::BudgetLedger::try_reserve) creates
/// one. It cannot be cloned; the unit goes back to the vendor exactly once,
/// either through [`Reservation::release`] or when the value is dropped
/// (including task cancellation and panics).
#[must_use = "dropping a reservation releases it immediately"]
pub struct Reservation {
    vendor: Arc<Vendor>,
}

impl Reservation {
    pub(crate) fn new(vendor: Arc<Vendor>) -> Self {
        Self { vendor }
    }

    /// Vendor holding this reservation
    pub fn vendor(&self) -> &Arc<Vendor> {
        &self.vendor
    }

    /// Release the reservation now
    ///
    /// Consumes `self`, so a second release does not compile.
    ///
    /// ```compile_fail
    /// use contracts::VendorSpec;
    /// use ledger::BudgetLedger;
    ///
    /// let ledger = BudgetLedger::from_specs(&[VendorSpec::new(1, "A", 1, "http://a/")]).unwrap();
    /// let reservation = BudgetLedger::try_reserve(&ledger.vendors()[0]).unwrap();
    /// reservation.release();
    /// reservation.release();
    /// ```
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.vendor.counter().release();
        trace!(
            vendor = %self.vendor.name(),
            utilized = self.vendor.utilized(),
            "reservation released"
        );
    }
}

impl fmt::Debug for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservation")
            .field("vendor", &self.vendor.name())
            .finish()
    }
}
