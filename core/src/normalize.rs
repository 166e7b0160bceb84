//! Transaction normalization — raw table rows to a fixed schema.
//!
//! RULE: Everything downstream assumes the normalized [`Transaction`]
//! shape. Schema variation in the input (legacy `amt` column, merchant
//! name prefixes, timestamp formats) is absorbed here and nowhere else.
//!
//! Policy on bad rows: a row with an unparseable timestamp or no amount
//! value is rejected and counted, not fatal. Only a header that carries
//! neither amount column aborts the load.

use crate::{
    error::{AnalysisError, AnalysisResult},
    types::{AccountId, Category},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Synthetic prefix the source dataset attaches to merchant names.
const MERCHANT_PREFIX: &str = "fraud_";

/// A raw input row as exported by the transaction table.
/// Column names follow the source export; `amount` is canonical and
/// `amt` is the legacy spelling some exports carry instead.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "trans_date_trans_time", alias = "timestamp")]
    pub timestamp: String,
    #[serde(rename = "cc_num", alias = "account_id")]
    pub account_id: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub amt: Option<f64>,
    pub merchant: String,
    pub category: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "trans_num", alias = "transaction_id")]
    pub transaction_id: String,
}

/// A normalized transaction. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub timestamp: NaiveDateTime,
    /// Calendar date of `timestamp` (floored to day granularity).
    pub transaction_date: NaiveDate,
    pub account_id: AccountId,
    pub amount: f64,
    pub merchant: String,
    pub category: Category,
    pub city: String,
    pub state: String,
    pub transaction_id: String,
}

/// Result of a normalization pass: the accepted rows plus a count of
/// rejected ones, so callers can surface data quality to the user.
#[derive(Debug)]
pub struct NormalizeOutcome {
    pub transactions: Vec<Transaction>,
    pub skipped_rows: usize,
}

/// Load and normalize a transaction table from a CSV file.
pub fn load_transactions<P: AsRef<Path>>(path: P) -> AnalysisResult<NormalizeOutcome> {
    let file = std::fs::File::open(path.as_ref())?;
    load_transactions_from_reader(file)
}

/// Load and normalize a transaction table from any CSV byte stream.
pub fn load_transactions_from_reader<R: Read>(reader: R) -> AnalysisResult<NormalizeOutcome> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if !headers.iter().any(|h| h == "amount" || h == "amt") {
        return Err(AnalysisError::Schema(
            "input table has neither 'amount' nor 'amt' column".into(),
        ));
    }

    let mut transactions = Vec::new();
    let mut skipped_rows = 0usize;

    for (idx, record) in csv_reader.deserialize::<RawRecord>().enumerate() {
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("row {}: rejected, malformed record: {e}", idx + 1);
                skipped_rows += 1;
                continue;
            }
        };
        match normalize_record(raw) {
            Some(txn) => transactions.push(txn),
            None => {
                log::warn!("row {}: rejected, bad timestamp or missing amount", idx + 1);
                skipped_rows += 1;
            }
        }
    }

    log::debug!(
        "normalized {} transactions, skipped {} rows",
        transactions.len(),
        skipped_rows
    );
    Ok(NormalizeOutcome {
        transactions,
        skipped_rows,
    })
}

fn normalize_record(raw: RawRecord) -> Option<Transaction> {
    // Canonical amount wins; fall back to the legacy column.
    let amount = raw.amount.or(raw.amt)?;
    let timestamp = parse_timestamp(&raw.timestamp)?;

    let merchant = raw
        .merchant
        .strip_prefix(MERCHANT_PREFIX)
        .unwrap_or(&raw.merchant)
        .to_string();

    Some(Transaction {
        transaction_date: timestamp.date(),
        timestamp,
        account_id: raw.account_id,
        amount,
        merchant,
        category: raw.category,
        city: raw.city,
        state: raw.state,
        transaction_id: raw.transaction_id,
    })
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts);
    }
    // Date-only exports: floor to midnight.
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
