//! BudgetCounter - lock-free bounded counter

use std::sync::atomic::{AtomicU64, Ordering};

/// Bounded utilization counter
///
/// Invariant: `0 <= utilized <= budget`. Acquire is a CAS retry loop,
/// release is a single atomic decrement and is only reachable through a
/// [`Reservation`](crate::Reservation).
#[derive(Debug)]
pub struct BudgetCounter {
    budget: u64,
    utilized: AtomicU64,
}

impl BudgetCounter {
    /// Create a counter with zero utilization
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            utilized: AtomicU64::new(0),
        }
    }

    /// Fixed capacity
    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Current utilization
    pub fn utilized(&self) -> u64 {
        self.utilized.load(Ordering::Acquire)
    }

    /// Remaining capacity
    pub fn available(&self) -> u64 {
        self.budget.saturating_sub(self.utilized())
    }

    /// Take one unit if `utilized < budget`
    ///
    /// Returns false without touching the counter when capacity is exhausted.
    pub(crate) fn try_acquire(&self) -> bool {
        let mut current = self.utilized.load(Ordering::Acquire);
        loop {
            if current >= self.budget {
                return false;
            }

            match self.utilized.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Give back one unit taken by a successful `try_acquire`
    pub(crate) fn release(&self) {
        let previous = self.utilized.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "release without matching acquire");
    }
}
