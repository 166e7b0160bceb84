//! Aggregator tests: customer summaries and daily series construction.

use chrono::NaiveDate;
use spendscope_core::{
    aggregate::{
        build_daily_series, category_stats, merchant_stats, spending_by_city, spending_by_state,
        summarize_customers,
    },
    error::AnalysisError,
    normalize::Transaction,
};

fn txn(date: &str, account: &str, amount: f64, category: &str) -> Transaction {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let timestamp = day.and_hms_opt(12, 0, 0).unwrap();
    Transaction {
        timestamp,
        transaction_date: day,
        account_id: account.to_string(),
        amount,
        merchant: "Corner Store".to_string(),
        category: category.to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        transaction_id: format!("t-{account}-{date}-{amount}"),
    }
}

#[test]
fn summary_computes_sum_mean_and_count() {
    let txns = vec![
        txn("2024-01-01", "1", 5.0, "grocery_pos"),
        txn("2024-01-02", "1", 15.0, "grocery_pos"),
    ];
    let summary = summarize_customers(&txns);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total_spending, 20.0);
    assert_eq!(summary[0].avg_spending, 10.0);
    assert_eq!(summary[0].transaction_count, 2);
}

#[test]
fn summary_is_sorted_by_account() {
    let txns = vec![
        txn("2024-01-01", "zeta", 1.0, "misc"),
        txn("2024-01-01", "alpha", 2.0, "misc"),
        txn("2024-01-01", "mid", 3.0, "misc"),
    ];
    let summary = summarize_customers(&txns);
    let ids: Vec<&str> = summary.iter().map(|s| s.account_id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn nan_amounts_count_as_zero_not_dropped() {
    let txns = vec![
        txn("2024-01-01", "1", 10.0, "misc"),
        txn("2024-01-02", "1", f64::NAN, "misc"),
    ];
    let summary = summarize_customers(&txns);
    assert_eq!(summary[0].total_spending, 10.0);
    assert_eq!(summary[0].avg_spending, 5.0);
    assert_eq!(summary[0].transaction_count, 2);
}

#[test]
fn daily_series_sums_per_calendar_day() {
    let txns = vec![
        txn("2024-01-01", "1", 10.0, "grocery_pos"),
        txn("2024-01-02", "1", 12.0, "grocery_pos"),
        txn("2024-01-03", "1", 1000.0, "grocery_pos"),
        txn("2024-01-02", "1", 3.0, "gas_transport"),
    ];
    let series = build_daily_series(&txns, "1", None).unwrap();
    assert_eq!(series.points.len(), 3);
    assert_eq!(series.points[0].amount, 10.0);
    assert_eq!(series.points[1].amount, 15.0); // 12 + 3 on the same day
    assert_eq!(series.points[2].amount, 1000.0);
}

#[test]
fn daily_series_is_ordered_even_from_unordered_input() {
    let txns = vec![
        txn("2024-01-03", "1", 3.0, "misc"),
        txn("2024-01-01", "1", 1.0, "misc"),
        txn("2024-01-02", "1", 2.0, "misc"),
    ];
    let series = build_daily_series(&txns, "1", None).unwrap();
    let dates: Vec<String> = series.points.iter().map(|p| p.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
}

#[test]
fn category_filter_narrows_the_series() {
    let txns = vec![
        txn("2024-01-01", "1", 10.0, "grocery_pos"),
        txn("2024-01-01", "1", 99.0, "gas_transport"),
    ];
    let series = build_daily_series(&txns, "1", Some("grocery_pos")).unwrap();
    assert_eq!(series.points.len(), 1);
    assert_eq!(series.points[0].amount, 10.0);
}

#[test]
fn days_without_transactions_are_absent() {
    let txns = vec![
        txn("2024-01-01", "1", 10.0, "misc"),
        txn("2024-01-05", "1", 20.0, "misc"),
    ];
    let series = build_daily_series(&txns, "1", None).unwrap();
    // No zero-fill for Jan 2-4.
    assert_eq!(series.points.len(), 2);
}

#[test]
fn empty_filter_is_an_empty_series_error() {
    let txns = vec![txn("2024-01-01", "1", 10.0, "grocery_pos")];
    let err = build_daily_series(&txns, "1", Some("travel")).unwrap_err();
    assert!(
        matches!(err, AnalysisError::EmptySeries { .. }),
        "expected EmptySeries, got {err:?}"
    );
    let err = build_daily_series(&txns, "999", None).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptySeries { .. }));
}

#[test]
fn daily_series_is_idempotent() {
    let txns = vec![
        txn("2024-01-01", "1", 10.0, "misc"),
        txn("2024-01-02", "1", 12.0, "misc"),
    ];
    let first = build_daily_series(&txns, "1", None).unwrap();
    let second = build_daily_series(&txns, "1", None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn breakdowns_sum_and_sort_descending() {
    let mut a = txn("2024-01-01", "1", 100.0, "grocery_pos");
    a.city = "Springfield".into();
    a.state = "IL".into();
    a.merchant = "Acme".into();
    let mut b = txn("2024-01-01", "2", 300.0, "travel");
    b.city = "Shelbyville".into();
    b.state = "MO".into();
    b.merchant = "Globex".into();
    let txns = vec![a, b];

    let cities = spending_by_city(&txns);
    assert_eq!(cities[0].city, "Shelbyville");
    assert_eq!(cities[0].total_spending, 300.0);

    let states = spending_by_state(&txns);
    assert_eq!(states[0].state, "MO");

    let cats = category_stats(&txns);
    assert_eq!(cats[0].category, "travel");
    assert_eq!(cats[0].transaction_volume, 1);

    let merchants = merchant_stats(&txns);
    assert_eq!(merchants[0].merchant, "Globex");
    assert_eq!(merchants[0].transaction_count, 1);
}
