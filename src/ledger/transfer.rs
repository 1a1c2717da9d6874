//! Transfer reconciliation.
//!
//! The source marks each side of an inter-account transfer with a one-sided
//! pointer: the guid of the far-end transaction. The two sides arrive as
//! independent records, in no guaranteed order. This pass pairs them up and
//! replaces the raw pointers with symmetric links, or fails the import when
//! any pointer never finds its partner.

use std::collections::HashMap;

use crate::error::{ExportError, Result};

use super::{Ledger, TxnId};

impl Ledger {
    /// Converts the one-sided far-end references collected during ingestion
    /// into validated bidirectional links.
    ///
    /// Walks transactions in ingestion order keeping a map of sides still
    /// waiting for their partner: a transaction whose far-end guid matches a
    /// waiting entry completes that pair; otherwise it registers itself
    /// under its own guid and waits. Transactions without a far-end
    /// reference are ignored. A non-empty map at the end is a
    /// data-integrity fault in the snapshot and aborts the import, carrying
    /// the dangling guids.
    pub fn reconcile_transfers(&mut self) -> Result<()> {
        let mut pending: HashMap<&str, TxnId> = HashMap::new();
        let mut completed: Vec<(TxnId, TxnId)> = Vec::new();

        for (index, txn) in self.transactions.iter().enumerate() {
            let Some(far_end) = txn.far_end_guid.as_deref() else {
                continue;
            };
            if let Some(partner) = pending.remove(far_end) {
                completed.push((partner, TxnId(index)));
            } else {
                pending.insert(txn.guid.as_str(), TxnId(index));
            }
        }

        if !pending.is_empty() {
            let mut dangling: Vec<String> = pending.into_keys().map(str::to_string).collect();
            dangling.sort();
            return Err(ExportError::UnresolvedTransfers(dangling));
        }

        for (left, right) in completed {
            self.transactions[left.0].transfer = Some(right);
            self.transactions[right.0].transfer = Some(left);
            self.transactions[left.0].far_end_guid = None;
            self.transactions[right.0].far_end_guid = None;
        }
        Ok(())
    }
}
