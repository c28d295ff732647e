//! PreferenceTable - message type to ordered vendor candidates

use std::collections::BTreeMap;
use std::sync::Arc;

use contracts::{MessageType, PreferenceConfig};
use ledger::{BudgetLedger, Vendor};

use crate::error::RouterError;

/// One candidate in a preference list
#[derive(Debug, Clone)]
pub struct VendorCandidate {
    vendor: Arc<Vendor>,
    weight: f32,
}

impl VendorCandidate {
    pub fn new(vendor: Arc<Vendor>, weight: f32) -> Self {
        Self { vendor, weight }
    }

    pub fn vendor(&self) -> &Arc<Vendor> {
        &self.vendor
    }

    /// Configured share; selection order does not consult it
    pub fn weight(&self) -> f32 {
        self.weight
    }
}

/// Immutable routing policy, built once at startup
#[derive(Debug, Default)]
pub struct PreferenceTable {
    entries: BTreeMap<MessageType, Vec<VendorCandidate>>,
}

impl PreferenceTable {
    /// Resolve configured preference lists against the ledger's vendors
    ///
    /// # Errors
    /// A candidate names a vendor the ledger does not hold, or two lists
    /// share a message type
    pub fn build(
        preferences: &[PreferenceConfig],
        ledger: &BudgetLedger,
    ) -> Result<Self, RouterError> {
        let mut entries = BTreeMap::new();

        for pref in preferences {
            let candidates = pref
                .candidates
                .iter()
                .map(|c| {
                    ledger
                        .vendor(&c.vendor)
                        .map(|v| VendorCandidate::new(Arc::clone(v), c.weight))
                        .ok_or_else(|| RouterError::unknown_vendor(pref.message_type, &c.vendor))
                })
                .collect::<Result<Vec<_>, _>>()?;

            if entries.insert(pref.message_type, candidates).is_some() {
                return Err(RouterError::DuplicatePreference {
                    message_type: pref.message_type,
                });
            }
        }

        Ok(Self { entries })
    }

    /// Build directly from resolved candidates
    pub fn from_entries(
        entries: impl IntoIterator<Item = (MessageType, Vec<VendorCandidate>)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Candidates for a message type, in priority order
    pub fn candidates(&self, message_type: MessageType) -> Option<&[VendorCandidate]> {
        self.entries.get(&message_type).map(Vec::as_slice)
    }

    /// Message types with a preference list
    pub fn message_types(&self) -> impl Iterator<Item = MessageType> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
