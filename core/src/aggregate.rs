//! Reductions over the normalized transaction table.
//!
//! All outputs here are derived, read-only views: they are recomputed
//! from the full transaction set, never mutated incrementally. Grouped
//! results use BTreeMap internally so output order is deterministic.

use crate::{
    error::{AnalysisError, AnalysisResult},
    normalize::Transaction,
    types::{AccountId, Category},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-customer spending summary, one row per account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub account_id: AccountId,
    pub total_spending: f64,
    pub avg_spending: f64,
    pub transaction_count: u64,
}

/// One entry of a daily spending series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Daily spending sums for one account, optionally filtered to one
/// category. Dates with no transactions are simply absent — no
/// zero-fill. Points are ordered ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub account_id: AccountId,
    /// `None` means all categories.
    pub category: Option<Category>,
    pub points: Vec<DailyPoint>,
}

impl DailySeries {
    pub fn min_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Median of the daily amounts. Zero for an empty series.
    pub fn median_amount(&self) -> f64 {
        let mut vals: Vec<f64> = self.points.iter().map(|p| p.amount).collect();
        if vals.is_empty() {
            return 0.0;
        }
        vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = vals.len();
        if n % 2 == 1 {
            vals[n / 2]
        } else {
            (vals[n / 2 - 1] + vals[n / 2]) / 2.0
        }
    }
}

/// Total spending grouped by city, highest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySpend {
    pub city: String,
    pub total_spending: f64,
}

/// Total spending grouped by state, highest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSpend {
    pub state: String,
    pub total_spending: f64,
}

/// Per-category volume and spend, highest spend first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: Category,
    pub transaction_volume: u64,
    pub total_amount_spent: f64,
}

/// Per-merchant spend and volume, highest spend first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantStats {
    pub merchant: String,
    pub total_spending: f64,
    pub transaction_count: u64,
}

/// NaN amounts are treated as zero before aggregation. This is an
/// explicit policy, not a silent drop: the row still counts.
fn amount_or_zero(txn: &Transaction) -> f64 {
    if txn.amount.is_nan() {
        0.0
    } else {
        txn.amount
    }
}

/// Group by account and compute sum, mean, and count of amounts.
/// Output is sorted by account id.
pub fn summarize_customers(transactions: &[Transaction]) -> Vec<CustomerSummary> {
    let mut grouped: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for txn in transactions {
        let entry = grouped.entry(txn.account_id.as_str()).or_insert((0.0, 0));
        entry.0 += amount_or_zero(txn);
        entry.1 += 1;
    }

    grouped
        .into_iter()
        .map(|(account_id, (total, count))| CustomerSummary {
            account_id: account_id.to_string(),
            total_spending: total,
            avg_spending: total / count as f64,
            transaction_count: count,
        })
        .collect()
}

/// Filter to one account (and category, unless `None`), then group by
/// transaction date and sum amounts.
pub fn build_daily_series(
    transactions: &[Transaction],
    account_id: &str,
    category: Option<&str>,
) -> AnalysisResult<DailySeries> {
    let mut grouped: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for txn in transactions {
        if txn.account_id != account_id {
            continue;
        }
        if let Some(cat) = category {
            if txn.category != cat {
                continue;
            }
        }
        *grouped.entry(txn.transaction_date).or_insert(0.0) += amount_or_zero(txn);
    }

    if grouped.is_empty() {
        return Err(AnalysisError::EmptySeries {
            account_id: account_id.to_string(),
            category: category.unwrap_or("All").to_string(),
        });
    }

    Ok(DailySeries {
        account_id: account_id.to_string(),
        category: category.map(str::to_string),
        points: grouped
            .into_iter()
            .map(|(date, amount)| DailyPoint { date, amount })
            .collect(),
    })
}

fn sorted_desc<T, F: Fn(&T) -> f64>(mut rows: Vec<T>, key: F) -> Vec<T> {
    rows.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

pub fn spending_by_city(transactions: &[Transaction]) -> Vec<CitySpend> {
    let mut grouped: BTreeMap<&str, f64> = BTreeMap::new();
    for txn in transactions {
        *grouped.entry(txn.city.as_str()).or_insert(0.0) += amount_or_zero(txn);
    }
    sorted_desc(
        grouped
            .into_iter()
            .map(|(city, total_spending)| CitySpend {
                city: city.to_string(),
                total_spending,
            })
            .collect(),
        |r| r.total_spending,
    )
}

pub fn spending_by_state(transactions: &[Transaction]) -> Vec<StateSpend> {
    let mut grouped: BTreeMap<&str, f64> = BTreeMap::new();
    for txn in transactions {
        *grouped.entry(txn.state.as_str()).or_insert(0.0) += amount_or_zero(txn);
    }
    sorted_desc(
        grouped
            .into_iter()
            .map(|(state, total_spending)| StateSpend {
                state: state.to_string(),
                total_spending,
            })
            .collect(),
        |r| r.total_spending,
    )
}

pub fn category_stats(transactions: &[Transaction]) -> Vec<CategoryStats> {
    let mut grouped: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for txn in transactions {
        let entry = grouped.entry(txn.category.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += amount_or_zero(txn);
    }
    sorted_desc(
        grouped
            .into_iter()
            .map(|(category, (volume, total))| CategoryStats {
                category: category.to_string(),
                transaction_volume: volume,
                total_amount_spent: total,
            })
            .collect(),
        |r| r.total_amount_spent,
    )
}

pub fn merchant_stats(transactions: &[Transaction]) -> Vec<MerchantStats> {
    let mut grouped: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for txn in transactions {
        let entry = grouped.entry(txn.merchant.as_str()).or_insert((0.0, 0));
        entry.0 += amount_or_zero(txn);
        entry.1 += 1;
    }
    sorted_desc(
        grouped
            .into_iter()
            .map(|(merchant, (total, count))| MerchantStats {
                merchant: merchant.to_string(),
                total_spending: total,
                transaction_count: count,
            })
            .collect(),
        |r| r.total_spending,
    )
}
