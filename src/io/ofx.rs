//! OFX document assembly.
//!
//! Aggregate tag names, nesting, and child order are a compatibility
//! contract with downstream importers and are reproduced exactly. The whole
//! document is assembled in memory and returned as bytes; nothing here
//! touches disk, so a failed import can never leave a partial statement
//! behind.

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;
use crate::ledger::{Account, Ledger, Transaction};
use crate::model::AccountKind;

/// Declarative header naming the target format version and declaring that no
/// encryption is in use. Written verbatim ahead of the document body.
const DOCUMENT_HEADER: &str = "<?xml version=\"1.0\" ?>\n<?OFX OFXHEADER=\"200\" VERSION=\"211\" SECURITY=\"NONE\" OLDFILEUID=\"NONE\" NEWFILEUID=\"NONE\" ?>\n";

/// Which side of a transfer an account-identifier aggregate describes. The
/// destination shape drops the bank sub-type carried by the source shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    From,
    To,
}

type XmlWriter = Writer<Vec<u8>>;

/// Assembles the complete OFX document for a fully ingested and reconciled
/// ledger. `generated_at` stamps the sign-on block and is the only
/// non-deterministic field of the output; inject a fixed value for
/// reproducible documents.
pub fn build_document(ledger: &Ledger, generated_at: NaiveDateTime) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(DOCUMENT_HEADER.as_bytes().to_vec(), b' ', 2);

    open(&mut writer, "OFX")?;
    write_signon(&mut writer, generated_at)?;

    let banks: Vec<&Account> = ledger
        .accounts()
        .filter(|account| matches!(account.kind, AccountKind::Bank(_)))
        .collect();
    let cards: Vec<&Account> = ledger
        .accounts()
        .filter(|account| account.kind == AccountKind::CreditCard)
        .collect();

    // A message set with no member accounts is omitted, not emitted empty.
    if !banks.is_empty() {
        open(&mut writer, "BANKMSGSRSV1")?;
        for account in banks {
            write_statement(&mut writer, ledger, account)?;
        }
        close(&mut writer, "BANKMSGSRSV1")?;
    }
    if !cards.is_empty() {
        open(&mut writer, "CREDITCARDMSGSRSV1")?;
        for account in cards {
            write_statement(&mut writer, ledger, account)?;
        }
        close(&mut writer, "CREDITCARDMSGSRSV1")?;
    }

    close(&mut writer, "OFX")?;

    let mut document = writer.into_inner();
    document.push(b'\n');
    Ok(document)
}

fn write_signon(writer: &mut XmlWriter, generated_at: NaiveDateTime) -> Result<()> {
    open(writer, "SIGNONMSGSRSV1")?;
    open(writer, "SONRS")?;
    write_status(writer)?;
    text(writer, "DTSERVER", &ofx_datetime(generated_at))?;
    text(writer, "LANGUAGE", "ENG")?;
    close(writer, "SONRS")?;
    close(writer, "SIGNONMSGSRSV1")?;
    Ok(())
}

fn write_status(writer: &mut XmlWriter) -> Result<()> {
    open(writer, "STATUS")?;
    text(writer, "CODE", "0")?;
    text(writer, "SEVERITY", "INFO")?;
    close(writer, "STATUS")?;
    Ok(())
}

fn write_statement(writer: &mut XmlWriter, ledger: &Ledger, account: &Account) -> Result<()> {
    let (response, statement) = match account.kind {
        AccountKind::Bank(_) => ("STMTTRNRS", "STMTRS"),
        AccountKind::CreditCard => ("CCSTMTTRNRS", "CCSTMTRS"),
    };

    open(writer, response)?;
    text(writer, "TRNUID", "1")?;
    write_status(writer)?;
    open(writer, statement)?;
    text(writer, "CURDEF", &account.currency)?;
    write_account_aggregate(writer, account, Direction::From)?;
    write_transaction_list(writer, ledger, account)?;
    open(writer, "LEDGERBAL")?;
    text(writer, "BALAMT", &account.balance)?;
    text(writer, "DTASOF", &ofx_datetime(account.balance_as_of))?;
    close(writer, "LEDGERBAL")?;
    close(writer, statement)?;
    close(writer, response)?;
    Ok(())
}

fn write_transaction_list(writer: &mut XmlWriter, ledger: &Ledger, account: &Account) -> Result<()> {
    open(writer, "BANKTRANLIST")?;
    // Range markers cover this account's own window, not the whole dataset.
    text(writer, "DTSTART", &ofx_date(account.oldest_transaction_at))?;
    text(writer, "DTEND", &ofx_date(account.newest_transaction_at))?;
    for &id in account.transaction_ids() {
        write_entry(writer, ledger, ledger.transaction(id), &ledger.fit_id(id))?;
    }
    close(writer, "BANKTRANLIST")?;
    Ok(())
}

fn write_entry(
    writer: &mut XmlWriter,
    ledger: &Ledger,
    txn: &Transaction,
    fit_id: &str,
) -> Result<()> {
    open(writer, "STMTTRN")?;
    text(writer, "TRNTYPE", txn.txn_type.as_str())?;
    text(writer, "DTPOSTED", &posted_datetime(txn.date))?;
    text(writer, "TRNAMT", &txn.amount)?;
    text(writer, "FITID", fit_id)?;
    text(writer, "NAME", &txn.name)?;
    if let Some(partner) = txn.transfer {
        let destination = ledger.owning_account(partner);
        write_account_aggregate(writer, destination, Direction::To)?;
    }
    if let Some(memo) = txn.memo.as_deref().filter(|memo| !memo.is_empty()) {
        text(writer, "MEMO", memo)?;
    }
    close(writer, "STMTTRN")?;
    Ok(())
}

/// Renders the polymorphic account-identifier aggregate for the given kind
/// and direction. Bank accounts expose their routing id, account number, and
/// sub-type on the source side and drop the sub-type on the destination
/// side; credit-card accounts expose the account number alone in both
/// shapes.
fn write_account_aggregate(
    writer: &mut XmlWriter,
    account: &Account,
    direction: Direction,
) -> Result<()> {
    match (account.kind, direction) {
        (AccountKind::Bank(sub), Direction::From) => {
            open(writer, "BANKACCTFROM")?;
            text(writer, "BANKID", &account.id.to_string())?;
            text(writer, "ACCTID", &account.account_number)?;
            text(writer, "ACCTTYPE", sub.as_str())?;
            close(writer, "BANKACCTFROM")?;
        }
        (AccountKind::Bank(_), Direction::To) => {
            open(writer, "BANKACCTTO")?;
            text(writer, "BANKID", &account.id.to_string())?;
            text(writer, "ACCTID", &account.account_number)?;
            close(writer, "BANKACCTTO")?;
        }
        (AccountKind::CreditCard, Direction::From) => {
            open(writer, "CCACCTFROM")?;
            text(writer, "ACCTID", &account.account_number)?;
            close(writer, "CCACCTFROM")?;
        }
        (AccountKind::CreditCard, Direction::To) => {
            open(writer, "CCACCTTO")?;
            text(writer, "ACCTID", &account.account_number)?;
            close(writer, "CCACCTTO")?;
        }
    }
    Ok(())
}

fn ofx_datetime(ts: NaiveDateTime) -> String {
    ts.format("%Y%m%d%H%M%S").to_string()
}

fn ofx_date(ts: NaiveDateTime) -> String {
    ts.format("%Y%m%d").to_string()
}

/// The source gives calendar dates, not times; posted timestamps render at
/// midnight.
fn posted_datetime(date: NaiveDate) -> String {
    format!("{}000000", date.format("%Y%m%d"))
}

fn open(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text(writer: &mut XmlWriter, name: &str, content: &str) -> Result<()> {
    open(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(content)))?;
    close(writer, name)
}
