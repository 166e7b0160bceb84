//! spend-report: headless analysis runner over a transaction CSV.
//!
//! Usage:
//!   spend-report --input transactions.csv --report segmentation.csv
//!   spend-report --input transactions.csv --model model.json \
//!       --config analysis.json --account 4512828414983801773 \
//!       --category All --days 30

use anyhow::Result;
use spendscope_core::{
    config::AnalysisConfig,
    forecast::ForecastModel,
    normalize,
    pretrained::PretrainedSpendModel,
    report,
    session::AnalysisSession,
};
use std::collections::BTreeSet;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input = str_arg(&args, "--input", "transactions.csv");
    let model_path = opt_arg(&args, "--model");
    let account = opt_arg(&args, "--account");
    let category = opt_arg(&args, "--category");
    let days = parse_arg(&args, "--days", 30u32);
    let clusters = parse_arg(&args, "--clusters", 4usize);
    let report_path = opt_arg(&args, "--report");

    let config = match opt_arg(&args, "--config") {
        Some(path) => AnalysisConfig::load(&path)?,
        None => AnalysisConfig::default(),
    };

    println!("spend-report");
    println!("  input:    {input}");
    println!("  clusters: {clusters}");
    println!("  days:     {days}");
    println!();

    let outcome = normalize::load_transactions(&input)?;
    log::info!("loaded {} transactions from {input}", outcome.transactions.len());
    if outcome.skipped_rows > 0 {
        println!("warning: {} input rows rejected", outcome.skipped_rows);
    }

    let model: Box<dyn ForecastModel> = match model_path {
        Some(path) => Box::new(PretrainedSpendModel::load(&path)?),
        // No fitted parameters given: fall back to a flat model at the
        // mean daily spend, good enough for smoke runs.
        None => Box::new(PretrainedSpendModel::flat(mean_daily_spend(
            &outcome.transactions,
        ))),
    };

    let mut session = AnalysisSession::new(outcome.transactions, model, config);

    println!("== Customer summary ({} accounts) ==", session.get_customer_summary().len());
    for row in session.get_customer_summary().iter().take(10) {
        println!(
            "  {:<22} total {:>12.2}  avg {:>9.2}  txns {:>6}",
            row.account_id, row.total_spending, row.avg_spending, row.transaction_count
        );
    }
    println!();

    match session.get_cluster_assignments(clusters) {
        Ok((_, summary)) => {
            println!("== Cluster summary ==");
            println!("  cluster  customers  total(mean)    avg(mean)   txns(mean)");
            for row in summary {
                println!(
                    "  {:>7}  {:>9}  {:>11.2}  {:>11.2}  {:>11.2}",
                    row.cluster,
                    row.customer_count,
                    row.total_spending_mean,
                    row.avg_spending_mean,
                    row.transaction_count_mean
                );
            }
            if let Some(path) = &report_path {
                let csv = report::cluster_report_csv(summary)?;
                std::fs::write(path, csv)?;
                println!("  report written to {path}");
            }
        }
        Err(e) => println!("segmentation skipped: {e}"),
    }
    println!();

    if let Some(account) = account {
        // "All" and absence both mean no category filter.
        let category = category.filter(|c| c.as_str() != "All");
        let category = category.as_deref();

        let series = session.get_daily_series(&account, category)?;
        println!(
            "== Daily series for {account} ({} days observed) ==",
            series.points.len()
        );

        let forecast = session.get_forecast(&account, category, days)?;
        println!("== Forecast ({} points, last {} shown) ==", forecast.len(), 7);
        for p in forecast.iter().rev().take(7).rev() {
            println!(
                "  {}  yhat {:>9.2}  [{:>9.2}, {:>9.2}]",
                p.date, p.yhat, p.yhat_lower, p.yhat_upper
            );
        }
        println!();

        let anomalies = session.get_anomalies(&account, category, days)?;
        let flagged: Vec<_> = anomalies.iter().filter(|a| a.is_anomaly).collect();
        if flagged.is_empty() {
            println!("== No anomalies detected ==");
        } else {
            println!("== Detected anomalies ==");
            for a in flagged {
                println!(
                    "  {}  actual {:>9.2}  predicted {:>9.2}  residual {:>9.2}",
                    a.date, a.actual, a.predicted, a.residual
                );
            }
        }
    }

    Ok(())
}

/// Mean of the per-day grand totals, used to seed the flat fallback model.
fn mean_daily_spend(transactions: &[spendscope_core::normalize::Transaction]) -> f64 {
    if transactions.is_empty() {
        return 0.0;
    }
    let days: BTreeSet<_> = transactions.iter().map(|t| t.transaction_date).collect();
    let total: f64 = transactions
        .iter()
        .map(|t| if t.amount.is_nan() { 0.0 } else { t.amount })
        .sum();
    total / days.len().max(1) as f64
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg(args: &[String], flag: &str, default: &str) -> String {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
        .unwrap_or_else(|| default.to_string())
}

fn opt_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}
