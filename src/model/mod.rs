use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Sub-type of a bank account, emitted as the OFX `ACCTTYPE` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankKind {
    Checking,
    Savings,
}

impl BankKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankKind::Checking => "CHECKING",
            BankKind::Savings => "SAVINGS",
        }
    }
}

/// Kind of an account. Bank and credit-card accounts differ in which
/// identifier aggregate they expose in the output document, so the kind is a
/// tagged union carrying the kind-specific data rather than a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Bank(BankKind),
    CreditCard,
}

impl FromStr for AccountKind {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Checking" => Ok(AccountKind::Bank(BankKind::Checking)),
            "Savings" => Ok(AccountKind::Bank(BankKind::Savings)),
            "CreditCard" => Ok(AccountKind::CreditCard),
            other => Err(ExportError::UnknownAccountKind(other.to_string())),
        }
    }
}

/// The closed set of transaction-type codes the OFX format accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Credit,
    Debit,
    Int,
    Div,
    Fee,
    Srvchg,
    Dep,
    Atm,
    Pos,
    Xfer,
    Check,
    Payment,
    Cash,
    DirectDep,
    DirectDebit,
    RepeatPmt,
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
            TransactionType::Int => "INT",
            TransactionType::Div => "DIV",
            TransactionType::Fee => "FEE",
            TransactionType::Srvchg => "SRVCHG",
            TransactionType::Dep => "DEP",
            TransactionType::Atm => "ATM",
            TransactionType::Pos => "POS",
            TransactionType::Xfer => "XFER",
            TransactionType::Check => "CHECK",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Cash => "CASH",
            TransactionType::DirectDep => "DIRECTDEP",
            TransactionType::DirectDebit => "DIRECTDEBIT",
            TransactionType::RepeatPmt => "REPEATPMT",
            TransactionType::Other => "OTHER",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CREDIT" => Ok(TransactionType::Credit),
            "DEBIT" => Ok(TransactionType::Debit),
            "INT" => Ok(TransactionType::Int),
            "DIV" => Ok(TransactionType::Div),
            "FEE" => Ok(TransactionType::Fee),
            "SRVCHG" => Ok(TransactionType::Srvchg),
            "DEP" => Ok(TransactionType::Dep),
            "ATM" => Ok(TransactionType::Atm),
            "POS" => Ok(TransactionType::Pos),
            "XFER" => Ok(TransactionType::Xfer),
            "CHECK" => Ok(TransactionType::Check),
            "PAYMENT" => Ok(TransactionType::Payment),
            "CASH" => Ok(TransactionType::Cash),
            "DIRECTDEP" => Ok(TransactionType::DirectDep),
            "DIRECTDEBIT" => Ok(TransactionType::DirectDebit),
            "REPEATPMT" => Ok(TransactionType::RepeatPmt),
            "OTHER" => Ok(TransactionType::Other),
            other => Err(ExportError::UnknownTransactionType(other.to_string())),
        }
    }
}

/// One account as delivered by the snapshot source.
///
/// `kind` and the monetary `balance` stay plain strings here: the kind is
/// validated when the record is ingested into the ledger, and the balance is
/// regurgitated verbatim into the output rather than routed through a float
/// that could shift its representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: i64,
    /// One of "Checking", "Savings", or "CreditCard".
    pub kind: String,
    pub account_number: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Decimal amount kept as its source string.
    pub balance: String,
    pub last_uploaded_at: NaiveDateTime,
    pub oldest_transaction_at: NaiveDateTime,
    pub newest_transaction_at: NaiveDateTime,
}

/// One transaction as delivered by the snapshot source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub guid: String,
    pub account_id: i64,
    pub date: NaiveDate,
    /// Decimal amount kept as its source string.
    pub amount: String,
    /// One of the OFX transaction-type codes; validated at ingestion.
    #[serde(rename = "type")]
    pub txn_type: String,
    /// Payee name.
    pub name: String,
    pub memo: Option<String>,
    /// Guid of the far end of an inter-account transfer, when the source
    /// marked this transaction as one side of a transfer.
    pub transfer_far_end_guid: Option<String>,
}
