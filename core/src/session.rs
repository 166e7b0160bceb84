//! Session-scoped analysis state and the public query surface.
//!
//! One session = one loaded transaction table + one injected forecast
//! model. The transaction set is immutable after load; everything else
//! is a derived view. Requests are synchronous and single-threaded: a
//! failed request surfaces its error and leaves previously cached
//! valid state untouched.

use crate::{
    aggregate::{
        self, CategoryStats, CitySpend, CustomerSummary, DailySeries, MerchantStats, StateSpend,
    },
    anomaly::{self, AnomalyRecord},
    config::AnalysisConfig,
    error::AnalysisResult,
    forecast::{ForecastAdapter, ForecastKey, ForecastModel, ForecastPoint},
    normalize::{self, Transaction},
    segment::{self, ClusterAssignment, ClusterSummaryRow, Segmentation},
    types::{AccountId, Category},
};
use std::collections::BTreeSet;
use std::path::Path;

pub struct AnalysisSession {
    config: AnalysisConfig,
    transactions: Vec<Transaction>,
    summaries: Vec<CustomerSummary>,
    /// Built lazily on first request, then kept for the session.
    /// The usize records the K it was built with.
    segmentation: Option<(usize, Segmentation)>,
    adapter: ForecastAdapter,
}

impl AnalysisSession {
    /// Build a session from already-normalized transactions and a
    /// forecast model handle loaded once at session start.
    pub fn new(
        transactions: Vec<Transaction>,
        model: Box<dyn ForecastModel>,
        config: AnalysisConfig,
    ) -> Self {
        let summaries = aggregate::summarize_customers(&transactions);
        let adapter = ForecastAdapter::new(model, &config);
        log::info!(
            "session ready: {} transactions, {} customers",
            transactions.len(),
            summaries.len()
        );
        Self {
            config,
            transactions,
            summaries,
            segmentation: None,
            adapter,
        }
    }

    /// Load the transaction table from a CSV file and build a session.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        model: Box<dyn ForecastModel>,
        config: AnalysisConfig,
    ) -> AnalysisResult<Self> {
        let outcome = normalize::load_transactions(path)?;
        if outcome.skipped_rows > 0 {
            log::warn!("{} input rows rejected during load", outcome.skipped_rows);
        }
        Ok(Self::new(outcome.transactions, model, config))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// One summary row per account, sorted by account id.
    pub fn get_customer_summary(&self) -> &[CustomerSummary] {
        &self.summaries
    }

    /// Cluster assignments and per-cluster summary for `k` groups.
    /// Computed once per K and reused for the rest of the session.
    pub fn get_cluster_assignments(
        &mut self,
        k: usize,
    ) -> AnalysisResult<(&[ClusterAssignment], &[ClusterSummaryRow])> {
        let hit = matches!(&self.segmentation, Some((built_k, _)) if *built_k == k);
        if !hit {
            let mut cfg = self.config.clone();
            cfg.cluster_count = k;
            let seg = segment::segment_customers(&self.summaries, &cfg)?;
            self.segmentation = Some((k, seg));
        }
        match &self.segmentation {
            Some((_, seg)) => Ok((&seg.assignments, &seg.clusters)),
            None => unreachable!("segmentation missing after build"),
        }
    }

    /// Daily spending sums for one account, optionally one category.
    pub fn get_daily_series(
        &self,
        account_id: &str,
        category: Option<&str>,
    ) -> AnalysisResult<DailySeries> {
        aggregate::build_daily_series(&self.transactions, account_id, category)
    }

    /// Forecast covering the historical range plus `horizon_days`.
    /// Served from the single-slot cache when the triple is unchanged.
    pub fn get_forecast(
        &mut self,
        account_id: &str,
        category: Option<&str>,
        horizon_days: u32,
    ) -> AnalysisResult<Vec<ForecastPoint>> {
        self.adapter.validate_horizon(horizon_days)?;
        // Build the series before touching the cache so an empty
        // filter cannot disturb a valid cached entry.
        let series = self.get_daily_series(account_id, category)?;
        let key = ForecastKey {
            account_id: account_id.to_string(),
            category: category.map(str::to_string),
            horizon_days,
        };
        Ok(self.adapter.forecast(&series, key)?.to_vec())
    }

    /// Residual-flagged records for the historical overlap of the
    /// series and its forecast. The threshold is recomputed per call.
    pub fn get_anomalies(
        &mut self,
        account_id: &str,
        category: Option<&str>,
        horizon_days: u32,
    ) -> AnalysisResult<Vec<AnomalyRecord>> {
        let series = self.get_daily_series(account_id, category)?;
        let forecast = self.get_forecast(account_id, category, horizon_days)?;
        Ok(anomaly::detect_anomalies(
            &series,
            &forecast,
            self.config.anomaly_sigma,
        ))
    }

    /// Key of the currently cached forecast. Exposed for tooling.
    pub fn cached_forecast_key(&self) -> Option<&ForecastKey> {
        self.adapter.cached_key()
    }

    pub fn spending_by_city(&self) -> Vec<CitySpend> {
        aggregate::spending_by_city(&self.transactions)
    }

    pub fn spending_by_state(&self) -> Vec<StateSpend> {
        aggregate::spending_by_state(&self.transactions)
    }

    pub fn category_stats(&self) -> Vec<CategoryStats> {
        aggregate::category_stats(&self.transactions)
    }

    pub fn merchant_stats(&self) -> Vec<MerchantStats> {
        aggregate::merchant_stats(&self.transactions)
    }

    /// Distinct account ids, sorted.
    pub fn account_ids(&self) -> Vec<AccountId> {
        self.summaries.iter().map(|s| s.account_id.clone()).collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<Category> {
        let set: BTreeSet<&str> = self
            .transactions
            .iter()
            .map(|t| t.category.as_str())
            .collect();
        set.into_iter().map(str::to_string).collect()
    }
}
