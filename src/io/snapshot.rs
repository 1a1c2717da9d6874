//! Reader for the aggregator's snapshot documents: an accounts listing and a
//! transactions listing, both plain XML.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};

use crate::error::{ExportError, Result};
use crate::model::{AccountRecord, TransactionRecord};

/// The source's single timestamp format.
const SOURCE_DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%SZ";
const SOURCE_DATE_FMT: &str = "%Y-%m-%d";

/// Parses an accounts document (`/accounts/account` elements) into records.
pub fn read_accounts(xml: &str) -> Result<Vec<AccountRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut fields: Option<BTreeMap<String, String>> = None;
    let mut current: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e.name().as_ref());
                if name == "account" {
                    fields = Some(BTreeMap::new());
                } else if fields.is_some() {
                    current = Some(name);
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(fields), Some(name)) = (fields.as_mut(), current.as_ref()) {
                    fields.insert(name.clone(), element_text(e));
                }
            }
            Ok(Event::End(ref e)) => {
                if element_name(e.name().as_ref()) == "account" {
                    if let Some(fields) = fields.take() {
                        records.push(account_record(&fields)?);
                    }
                } else {
                    current = None;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => return Err(error.into()),
        }
        buf.clear();
    }

    Ok(records)
}

/// Parses a transactions document (`/txactions/txaction` elements) into
/// records. A nested `<transfer><guid>…</guid></transfer>` element becomes
/// the record's far-end transfer reference.
pub fn read_transactions(xml: &str) -> Result<Vec<TransactionRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut fields: Option<BTreeMap<String, String>> = None;
    let mut current: Option<String> = None;
    let mut in_transfer = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e.name().as_ref());
                if name == "txaction" {
                    fields = Some(BTreeMap::new());
                    in_transfer = false;
                } else if name == "transfer" && fields.is_some() {
                    in_transfer = true;
                } else if fields.is_some() {
                    current = Some(if in_transfer {
                        format!("transfer-{name}")
                    } else {
                        name
                    });
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(fields), Some(name)) = (fields.as_mut(), current.as_ref()) {
                    fields.insert(name.clone(), element_text(e));
                }
            }
            Ok(Event::End(ref e)) => {
                let name = element_name(e.name().as_ref());
                if name == "txaction" {
                    if let Some(fields) = fields.take() {
                        records.push(transaction_record(&fields)?);
                    }
                } else if name == "transfer" {
                    in_transfer = false;
                } else {
                    current = None;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => return Err(error.into()),
        }
        buf.clear();
    }

    Ok(records)
}

fn account_record(fields: &BTreeMap<String, String>) -> Result<AccountRecord> {
    // The aggregator spells the credit-card kind with a space.
    let kind = match require(fields, "account-type")? {
        "Credit Card" => "CreditCard",
        other => other,
    };

    Ok(AccountRecord {
        id: parse_int("id", require(fields, "id")?)?,
        kind: kind.to_string(),
        account_number: require(fields, "account-number")?.to_string(),
        currency: require(fields, "currency")?.to_string(),
        balance: require(fields, "current-balance")?.to_string(),
        last_uploaded_at: parse_timestamp(
            "last-uploaded-at",
            require(fields, "last-uploaded-at")?,
        )?,
        oldest_transaction_at: parse_timestamp(
            "oldest-txaction",
            require(fields, "oldest-txaction")?,
        )?,
        newest_transaction_at: parse_timestamp(
            "newest-txaction",
            require(fields, "newest-txaction")?,
        )?,
    })
}

fn transaction_record(fields: &BTreeMap<String, String>) -> Result<TransactionRecord> {
    Ok(TransactionRecord {
        guid: require(fields, "guid")?.to_string(),
        account_id: parse_int("account-id", require(fields, "account-id")?)?,
        date: parse_date("date", require(fields, "date")?)?,
        amount: require(fields, "amount")?.to_string(),
        txn_type: require(fields, "raw-txntype")?.to_string(),
        name: require(fields, "raw-name")?.to_string(),
        memo: fields.get("memo").cloned(),
        transfer_far_end_guid: fields.get("transfer-guid").cloned(),
    })
}

fn require<'a>(fields: &'a BTreeMap<String, String>, element: &str) -> Result<&'a str> {
    fields
        .get(element)
        .map(String::as_str)
        .ok_or_else(|| ExportError::MissingElement(element.to_string()))
}

fn parse_int(element: &str, value: &str) -> Result<i64> {
    value.parse().map_err(|_| invalid(element, value))
}

fn parse_date(element: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, SOURCE_DATE_FMT).map_err(|_| invalid(element, value))
}

fn parse_timestamp(element: &str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, SOURCE_DATETIME_FMT).map_err(|_| invalid(element, value))
}

fn invalid(element: &str, value: &str) -> ExportError {
    ExportError::InvalidValue {
        element: element.to_string(),
        value: value.to_string(),
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn element_text(e: &BytesText) -> String {
    unescape_entities(String::from_utf8_lossy(e.as_ref()).trim())
}

/// Unescape the predefined XML entities. `&amp;` goes last so an escaped
/// ampersand never turns into a second round of unescaping.
fn unescape_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
