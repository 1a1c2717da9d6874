use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ExportError, Result};
use crate::model::{AccountKind, AccountRecord, TransactionRecord, TransactionType};

pub mod fitid;
pub mod transfer;

use fitid::BucketKey;

/// Handle to a transaction in the ledger's arena. Cross-references between
/// entities (transfer links, bucket membership) are stored as these handles
/// rather than as mutual pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxnId(pub(crate) usize);

/// One account from the snapshot, together with its attached transactions
/// and the bucket index used for identifier allocation.
#[derive(Debug)]
pub struct Account {
    pub id: i64,
    pub kind: AccountKind,
    pub account_number: String,
    pub currency: String,
    /// Decimal balance kept as its source string.
    pub balance: String,
    pub balance_as_of: NaiveDateTime,
    pub oldest_transaction_at: NaiveDateTime,
    pub newest_transaction_at: NaiveDateTime,
    transactions: Vec<TxnId>,
    buckets: BTreeMap<BucketKey, Vec<TxnId>>,
}

impl Account {
    /// Attached transactions in ingestion order. Statement output preserves
    /// this order; the bucket index sorts only for identifier allocation.
    pub fn transaction_ids(&self) -> &[TxnId] {
        &self.transactions
    }
}

/// One transaction from the snapshot. Everything except the transfer link is
/// immutable after attachment; the link is set once by transfer
/// reconciliation.
#[derive(Debug)]
pub struct Transaction {
    pub guid: String,
    pub date: NaiveDate,
    /// Decimal amount kept as its source string.
    pub amount: String,
    pub txn_type: TransactionType,
    /// Payee name.
    pub name: String,
    pub memo: Option<String>,
    /// The paired transaction once reconciliation has matched both sides.
    pub transfer: Option<TxnId>,
    pub(crate) account: usize,
    pub(crate) bucket: BucketKey,
    pub(crate) far_end_guid: Option<String>,
}

/// Registry of all accounts and transactions for one import pass.
///
/// Accounts and transactions live in arenas owned here, in ingestion order.
/// The ledger is populated by [`add_account`](Ledger::add_account) and
/// [`add_transaction`](Ledger::add_transaction), sealed by
/// [`reconcile_transfers`](Ledger::reconcile_transfers), and then only read.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: Vec<Account>,
    account_ids: HashMap<i64, usize>,
    transactions: Vec<Transaction>,
    guids: HashMap<String, TxnId>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Ingests a complete snapshot and reconciles its transfers, yielding a
    /// ledger ready for document assembly.
    pub fn from_snapshot(
        accounts: Vec<AccountRecord>,
        transactions: Vec<TransactionRecord>,
    ) -> Result<Self> {
        let mut ledger = Ledger::new();
        for record in accounts {
            ledger.add_account(record)?;
        }
        for record in transactions {
            ledger.add_transaction(record)?;
        }
        ledger.reconcile_transfers()?;
        Ok(ledger)
    }

    /// Registers an account from its snapshot record, validating the kind.
    pub fn add_account(&mut self, record: AccountRecord) -> Result<()> {
        let kind = AccountKind::from_str(&record.kind)?;
        let index = self.accounts.len();
        self.account_ids.insert(record.id, index);
        self.accounts.push(Account {
            id: record.id,
            kind,
            account_number: record.account_number,
            currency: record.currency,
            balance: record.balance,
            balance_as_of: record.last_uploaded_at,
            oldest_transaction_at: record.oldest_transaction_at,
            newest_transaction_at: record.newest_transaction_at,
            transactions: Vec::new(),
            buckets: BTreeMap::new(),
        });
        Ok(())
    }

    /// Attaches a transaction to its owning account and inserts it into the
    /// account's bucket index, keeping the bucket sorted under the fixed
    /// tie-break order.
    pub fn add_transaction(&mut self, record: TransactionRecord) -> Result<TxnId> {
        if self.guids.contains_key(&record.guid) {
            return Err(ExportError::DuplicateGuid(record.guid));
        }
        let account_index = *self
            .account_ids
            .get(&record.account_id)
            .ok_or(ExportError::UnknownAccount(record.account_id))?;
        let txn_type = TransactionType::from_str(&record.txn_type)?;

        let bucket = BucketKey::new(record.date, record.amount.clone());
        let id = TxnId(self.transactions.len());
        self.guids.insert(record.guid.clone(), id);
        self.transactions.push(Transaction {
            guid: record.guid,
            date: record.date,
            amount: record.amount,
            txn_type,
            name: record.name,
            memo: record.memo,
            transfer: None,
            account: account_index,
            bucket: bucket.clone(),
            far_end_guid: record.transfer_far_end_guid,
        });

        let transactions = &self.transactions;
        let account = &mut self.accounts[account_index];
        account.transactions.push(id);
        let members = account.buckets.entry(bucket).or_default();
        members.push(id);
        members.sort_by(|a, b| fitid::tie_break(&transactions[a.0], &transactions[b.0]));
        Ok(id)
    }

    /// Accounts in registry (ingestion) order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn transaction(&self, id: TxnId) -> &Transaction {
        &self.transactions[id.0]
    }

    pub fn owning_account(&self, id: TxnId) -> &Account {
        &self.accounts[self.transactions[id.0].account]
    }

    pub fn find_transaction(&self, guid: &str) -> Option<TxnId> {
        self.guids.get(guid).copied()
    }

    /// Renders the synthesized identifier for a transaction from its current
    /// ordinal position within its sorted bucket. Recomputed on every call;
    /// never cached past a bucket mutation.
    pub fn fit_id(&self, id: TxnId) -> String {
        let txn = &self.transactions[id.0];
        let account = &self.accounts[txn.account];
        let ordinal = account.buckets[&txn.bucket]
            .iter()
            .position(|member| *member == id)
            .expect("transaction is indexed in its owning bucket");
        fitid::render(account.id, &txn.bucket, ordinal)
    }
}
