//! Vendor - shared runtime handle

use contracts::{VendorId, VendorSpec};

use crate::BudgetCounter;

/// Runtime vendor
///
/// Created once by the [`BudgetLedger`](crate::BudgetLedger) and shared as
/// `Arc<Vendor>`. The identity is immutable; only the budget counter changes.
#[derive(Debug)]
pub struct Vendor {
    spec: VendorSpec,
    counter: BudgetCounter,
}

impl Vendor {
    pub(crate) fn new(spec: VendorSpec) -> Self {
        let counter = BudgetCounter::new(spec.budget);
        Self { spec, counter }
    }

    pub fn id(&self) -> VendorId {
        self.spec.id
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn locator(&self) -> &str {
        &self.spec.locator
    }

    /// Static description passed to transports
    pub fn spec(&self) -> &VendorSpec {
        &self.spec
    }

    pub fn budget(&self) -> u64 {
        self.counter.budget()
    }

    pub fn utilized(&self) -> u64 {
        self.counter.utilized()
    }

    pub fn available(&self) -> u64 {
        self.counter.available()
    }

    pub(crate) fn counter(&self) -> &BudgetCounter {
        &self.counter
    }
}
