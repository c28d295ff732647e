//! BudgetLedger - vendor registry and admission control

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use contracts::VendorSpec;
use tracing::{debug, trace};

use crate::{LedgerError, Reservation, Vendor};

/// Vendor registry and reserve/release entry point
#[derive(Debug)]
pub struct BudgetLedger {
    vendors: Vec<Arc<Vendor>>,
    by_name: HashMap<String, usize>,
}

impl BudgetLedger {
    /// Build the registry from vendor specs
    ///
    /// # Errors
    /// Duplicate vendor names or ids
    pub fn from_specs(specs: &[VendorSpec]) -> Result<Self, LedgerError> {
        let mut vendors = Vec::with_capacity(specs.len());
        let mut by_name = HashMap::with_capacity(specs.len());
        let mut ids = HashSet::with_capacity(specs.len());

        for spec in specs {
            if !ids.insert(spec.id) {
                return Err(LedgerError::DuplicateId { id: spec.id });
            }
            if by_name.insert(spec.name.clone(), vendors.len()).is_some() {
                return Err(LedgerError::DuplicateName {
                    name: spec.name.clone(),
                });
            }
            vendors.push(Arc::new(Vendor::new(spec.clone())));
        }

        debug!(vendors = vendors.len(), "budget ledger initialized");
        Ok(Self { vendors, by_name })
    }

    /// Try to take one unit of the vendor's budget
    ///
    /// `None` means the vendor is at capacity; that is normal steady state.
    pub fn try_reserve(vendor: &Arc<Vendor>) -> Option<Reservation> {
        if vendor.counter().try_acquire() {
            trace!(
                vendor = %vendor.name(),
                utilized = vendor.utilized(),
                budget = vendor.budget(),
                "reservation granted"
            );
            Some(Reservation::new(Arc::clone(vendor)))
        } else {
            None
        }
    }

    /// Look up a vendor by name
    pub fn vendor(&self, name: &str) -> Option<&Arc<Vendor>> {
        self.by_name.get(name).map(|&idx| &self.vendors[idx])
    }

    /// All vendors, in configuration order
    pub fn vendors(&self) -> &[Arc<Vendor>] {
        &self.vendors
    }

    /// Current utilization of a vendor
    pub fn utilized(&self, name: &str) -> Option<u64> {
        self.vendor(name).map(|v| v.utilized())
    }

    /// Point-in-time usage of every vendor
    pub fn snapshot(&self) -> Vec<VendorUsage> {
        self.vendors
            .iter()
            .map(|v| VendorUsage {
                name: v.name().to_string(),
                budget: v.budget(),
                utilized: v.utilized(),
            })
            .collect()
    }
}

/// Usage of one vendor at snapshot time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorUsage {
    pub name: String,
    pub budget: u64,
    pub utilized: u64,
}

impl VendorUsage {
    pub fn available(&self) -> u64 {
        self.budget.saturating_sub(self.utilized)
    }
}
