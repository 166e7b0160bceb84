//! Session-level tests: query surface wiring and session-scoped state.

use chrono::NaiveDate;
use spendscope_core::{
    config::AnalysisConfig,
    error::AnalysisError,
    normalize::{load_transactions_from_reader, Transaction},
    pretrained::PretrainedSpendModel,
    session::AnalysisSession,
};

fn txn(date: &str, account: &str, amount: f64, category: &str) -> Transaction {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    Transaction {
        timestamp: day.and_hms_opt(12, 0, 0).unwrap(),
        transaction_date: day,
        account_id: account.to_string(),
        amount,
        merchant: "Corner Store".to_string(),
        category: category.to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        transaction_id: format!("t-{account}-{date}"),
    }
}

fn demo_session() -> AnalysisSession {
    let mut txns = Vec::new();
    // Four accounts with distinct behavior so K=4 segmentation works.
    for (i, (account, amount)) in [("a", 10.0), ("b", 100.0), ("c", 1000.0), ("d", 10000.0)]
        .iter()
        .enumerate()
    {
        for d in 1..=(i + 2) {
            txns.push(txn(
                &format!("2024-01-{d:02}"),
                account,
                *amount,
                "grocery_pos",
            ));
        }
    }
    AnalysisSession::new(
        txns,
        Box::new(PretrainedSpendModel::flat(10.0)),
        AnalysisConfig::default(),
    )
}

#[test]
fn summary_is_precomputed_per_account() {
    let session = demo_session();
    let summary = session.get_customer_summary();
    assert_eq!(summary.len(), 4);
    assert_eq!(summary[0].account_id, "a");
    assert_eq!(summary[0].total_spending, 20.0);
    assert_eq!(summary[0].transaction_count, 2);
}

#[test]
fn cluster_assignments_cover_all_accounts() {
    let mut session = demo_session();
    let (assignments, clusters) = session.get_cluster_assignments(4).unwrap();
    assert_eq!(assignments.len(), 4);
    let members: u64 = clusters.iter().map(|c| c.customer_count).sum();
    assert_eq!(members, 4);

    // A different K recomputes against the same summaries.
    let (assignments, _) = session.get_cluster_assignments(2).unwrap();
    assert_eq!(assignments.len(), 4);
    assert!(assignments.iter().all(|a| a.cluster < 2));
}

#[test]
fn alternating_k_requests_rebuild_and_reuse_the_segmentation() {
    let mut session = demo_session();

    let first = session.get_cluster_assignments(4).unwrap().0.to_vec();
    // Same K again is served from the session's stored segmentation.
    let again = session.get_cluster_assignments(4).unwrap().0.to_vec();
    assert_eq!(first, again);

    // Switching K rebuilds, and switching back rebuilds again with the
    // same seed, so the original partition returns.
    let halved = session.get_cluster_assignments(2).unwrap().0.to_vec();
    assert!(halved.iter().all(|a| a.cluster < 2));
    let back = session.get_cluster_assignments(4).unwrap().0.to_vec();
    assert_eq!(first, back);
}

#[test]
fn config_load_fills_missing_fields_with_defaults() {
    let path = std::env::temp_dir().join("spendscope-session-config.json");
    std::fs::write(&path, r#"{ "cluster_count": 6, "anomaly_sigma": 2.5 }"#).unwrap();

    let config = AnalysisConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.cluster_count, 6);
    assert_eq!(config.anomaly_sigma, 2.5);
    assert_eq!(config.kmeans_seed, 42);
    assert_eq!(config.min_horizon_days, 7);
    assert_eq!(config.max_horizon_days, 180);

    std::fs::remove_file(&path).ok();
}

#[test]
fn oversized_k_surfaces_insufficient_data() {
    let mut session = demo_session();
    let err = session.get_cluster_assignments(10).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData { .. }));
}

#[test]
fn unknown_filters_surface_empty_series() {
    let session = demo_session();
    let err = session.get_daily_series("a", Some("travel")).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptySeries { .. }));
}

#[test]
fn account_ids_and_categories_are_sorted_and_distinct() {
    let session = demo_session();
    assert_eq!(session.account_ids(), vec!["a", "b", "c", "d"]);
    assert_eq!(session.categories(), vec!["grocery_pos"]);
}

#[test]
fn csv_load_feeds_the_session_end_to_end() {
    let csv = "\
trans_date_trans_time,cc_num,amt,merchant,category,city,state,trans_num
2024-01-01 09:00:00,111,10.00,fraud_Acme,grocery_pos,Springfield,IL,t1
2024-01-02 09:00:00,111,12.00,fraud_Acme,grocery_pos,Springfield,IL,t2
";
    let outcome = load_transactions_from_reader(csv.as_bytes()).unwrap();
    let mut session = AnalysisSession::new(
        outcome.transactions,
        Box::new(PretrainedSpendModel::flat(11.0)),
        AnalysisConfig::default(),
    );

    let series = session.get_daily_series("111", None).unwrap();
    assert_eq!(series.points.len(), 2);
    assert_eq!(session.merchant_stats()[0].merchant, "Acme");

    let forecast = session.get_forecast("111", None, 7).unwrap();
    assert_eq!(forecast.len(), 9); // 2 history days + 7 future
}
