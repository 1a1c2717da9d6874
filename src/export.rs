use std::fs;
use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::io::{ofx, snapshot};
use crate::ledger::Ledger;

/// Converts a fetched snapshot pair into an OFX document on disk, stamping
/// the sign-on block with the current wall-clock time.
pub fn snapshot_to_ofx(accounts: &Path, transactions: &Path, output: &Path) -> Result<()> {
    snapshot_to_ofx_at(accounts, transactions, output, Utc::now().naive_utc())
}

/// Same as [`snapshot_to_ofx`] with an explicit generation timestamp, which
/// makes the produced document fully reproducible.
#[instrument(
    level = "info",
    skip_all,
    fields(accounts = %accounts.display(), transactions = %transactions.display(), output = %output.display())
)]
pub fn snapshot_to_ofx_at(
    accounts: &Path,
    transactions: &Path,
    output: &Path,
    generated_at: NaiveDateTime,
) -> Result<()> {
    let account_records = snapshot::read_accounts(&fs::read_to_string(accounts)?)?;
    info!(account_count = account_records.len(), "parsed accounts snapshot");
    let transaction_records = snapshot::read_transactions(&fs::read_to_string(transactions)?)?;
    info!(
        transaction_count = transaction_records.len(),
        "parsed transactions snapshot"
    );

    let ledger = Ledger::from_snapshot(account_records, transaction_records)?;
    debug!("ledger populated and transfers reconciled");

    let document = ofx::build_document(&ledger, generated_at)?;
    // The document is fully assembled before the file is created, so a
    // failing import never leaves a truncated statement on disk.
    fs::write(output, document)?;
    Ok(())
}
