//! Synthesized transaction identifiers.
//!
//! The snapshot source provides no native per-transaction identifier, yet
//! importers rely on one to detect duplicates, so a stand-in is synthesized
//! from the attributes that are available. Transactions are grouped into
//! buckets of (account, date, amount); a transaction's identifier is its
//! bucket key plus its ordinal position within the bucket under a fixed
//! total order, so two same-day purchases for the same amount still get
//! distinct, stable identifiers.
//!
//! Precondition on callers: every run must be fed the full set of
//! transactions that could ever share a bucket with one another. A windowed
//! refetch that cuts off part of a previously seen bucket shifts the
//! ordinals of the remaining members, and downstream duplicate detection
//! breaks. Nothing here can verify that; it is an operational contract on
//! whoever selects the snapshot window.

use std::cmp::Ordering;

use chrono::NaiveDate;

use super::Transaction;

/// Grouping key for transactions that are otherwise indistinguishable to an
/// importer: same account, same day, same amount. The account is implicit —
/// buckets are owned per account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BucketKey {
    pub date: NaiveDate,
    /// Decimal amount in its source-string form.
    pub amount: String,
}

impl BucketKey {
    pub(crate) fn new(date: NaiveDate, amount: String) -> Self {
        BucketKey { date, amount }
    }
}

/// Fixed total order for bucket members: date, then amount, then payee name,
/// then memo (absent sorts lowest), then guid. Guids are unique, so the
/// order always resolves; the guid fallback is intentionally arbitrary but
/// stable.
pub(crate) fn tie_break(a: &Transaction, b: &Transaction) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.amount.cmp(&b.amount))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.memo.cmp(&b.memo))
        .then_with(|| a.guid.cmp(&b.guid))
}

pub(crate) fn render(account_id: i64, bucket: &BucketKey, ordinal: usize) -> String {
    format!(
        "{}:{}:{}:{}",
        account_id,
        bucket.date.format("%Y%m%d"),
        bucket.amount,
        ordinal
    )
}
