//! Forecast adapter — a pretrained model behind a single-slot cache.
//!
//! The model itself is a black box: given a date index it returns point
//! estimates with confidence bounds. The adapter owns horizon
//! validation and a one-entry memo keyed by the full
//! (account, category, horizon) triple. Any key change invalidates the
//! slot wholesale; there is no partial invalidation and no LRU — this
//! is a single-user, single-session cache.

use crate::{
    aggregate::DailySeries,
    config::AnalysisConfig,
    error::{AnalysisError, AnalysisResult},
    types::{AccountId, Category},
};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// The two operations a pretrained forecasting model must expose.
/// Training happens offline and is out of scope; implementations are
/// loaded once per session and treated as immutable.
pub trait ForecastModel {
    /// Daily date index from `start` through `end` plus `horizon_days`
    /// further future days, inclusive on both ends.
    fn extend_index(&self, start: NaiveDate, end: NaiveDate, horizon_days: u32) -> Vec<NaiveDate>;

    /// Point estimate with confidence bounds for each date in `index`.
    fn predict(&self, index: &[NaiveDate]) -> Vec<ForecastPoint>;
}

/// Value-equality cache key. Structural inequality is the whole
/// invalidation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastKey {
    pub account_id: AccountId,
    /// `None` means all categories.
    pub category: Option<Category>,
    pub horizon_days: u32,
}

pub struct ForecastAdapter {
    model: Box<dyn ForecastModel>,
    min_horizon_days: u32,
    max_horizon_days: u32,
    cache: Option<(ForecastKey, Vec<ForecastPoint>)>,
}

impl ForecastAdapter {
    pub fn new(model: Box<dyn ForecastModel>, config: &AnalysisConfig) -> Self {
        Self {
            model,
            min_horizon_days: config.min_horizon_days,
            max_horizon_days: config.max_horizon_days,
            cache: None,
        }
    }

    /// Reject out-of-bounds horizons before the model is ever invoked.
    pub fn validate_horizon(&self, horizon_days: u32) -> AnalysisResult<()> {
        if horizon_days < self.min_horizon_days || horizon_days > self.max_horizon_days {
            return Err(AnalysisError::InvalidHorizon {
                days: horizon_days,
                min: self.min_horizon_days,
                max: self.max_horizon_days,
            });
        }
        Ok(())
    }

    /// Forecast points for every date from the series' first date
    /// through its last date plus the horizon. A key identical to the
    /// cached one returns the memo without touching the model.
    pub fn forecast(
        &mut self,
        series: &DailySeries,
        key: ForecastKey,
    ) -> AnalysisResult<&[ForecastPoint]> {
        self.validate_horizon(key.horizon_days)?;

        let hit = matches!(&self.cache, Some((cached, _)) if *cached == key);
        if hit {
            log::debug!("forecast cache hit for account {}", key.account_id);
            match &self.cache {
                Some((_, points)) => return Ok(points),
                None => unreachable!("cache hit without cache entry"),
            }
        }

        let (start, end) = match (series.min_date(), series.max_date()) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AnalysisError::EmptySeries {
                    account_id: key.account_id.clone(),
                    category: key.category.clone().unwrap_or_else(|| "All".into()),
                })
            }
        };

        let index = self.model.extend_index(start, end, key.horizon_days);
        let points = self.model.predict(&index);
        log::debug!(
            "forecast recomputed: account {}, {} points, horizon {}",
            key.account_id,
            points.len(),
            key.horizon_days
        );

        let (_, points) = self.cache.insert((key, points));
        Ok(points)
    }

    /// Key of the currently cached forecast, if any.
    pub fn cached_key(&self) -> Option<&ForecastKey> {
        self.cache.as_ref().map(|(key, _)| key)
    }
}
