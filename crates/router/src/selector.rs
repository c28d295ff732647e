//! VendorSelector - first-fit reservation over a preference list

use std::sync::Arc;

use contracts::Message;
use ledger::{BudgetLedger, Reservation};
use tracing::trace;

use crate::error::RouterError;
use crate::preference::PreferenceTable;

/// Walks a message type's candidates in configured order and returns the
/// first reservation granted.
#[derive(Debug, Clone)]
pub struct VendorSelector {
    table: Arc<PreferenceTable>,
}

impl VendorSelector {
    pub fn new(table: Arc<PreferenceTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<PreferenceTable> {
        &self.table
    }

    /// Select a vendor for the message
    ///
    /// `Ok(None)` means no candidate has capacity right now.
    ///
    /// # Errors
    /// `UnknownMessageType` when the type has no preference list.
    pub fn select(&self, message: &Message) -> Result<Option<Reservation>, RouterError> {
        let candidates = self.table.candidates(message.message_type).ok_or(
            RouterError::UnknownMessageType {
                message_type: message.message_type,
            },
        )?;

        let reservation = candidates
            .iter()
            .find_map(|candidate| BudgetLedger::try_reserve(candidate.vendor()));

        if reservation.is_none() {
            trace!(
                message_id = message.id,
                message_type = %message.message_type,
                "no vendor capacity"
            );
        }

        Ok(reservation)
    }
}
