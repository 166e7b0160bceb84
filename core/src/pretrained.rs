//! Pretrained spending model — parameters fitted offline.
//!
//! The fit itself happens out of process; this side only deserializes
//! the parameter file once at session start and evaluates it. The
//! shape is a linear trend with multiplicative weekly seasonality and
//! a constant residual sigma for the confidence band.

use crate::{
    error::AnalysisResult,
    forecast::{ForecastModel, ForecastPoint},
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width of the confidence band in residual sigmas (~95%).
const BAND_SIGMAS: f64 = 1.96;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PretrainedSpendModel {
    /// First date of the training window; the trend is measured from here.
    pub origin: NaiveDate,
    /// Fitted level at the origin date.
    pub base_level: f64,
    /// Fitted per-day trend.
    pub daily_trend: f64,
    /// Multiplicative day-of-week factors, Monday through Sunday.
    pub weekday_factors: [f64; 7],
    /// Residual standard deviation from the training fit.
    pub sigma: f64,
}

impl PretrainedSpendModel {
    /// Load fitted parameters from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let model = serde_json::from_str(&content)?;
        Ok(model)
    }

    /// A trendless, season-free model predicting `level` every day.
    /// Useful as a placeholder when no fitted parameter file is at hand.
    pub fn flat(level: f64) -> Self {
        Self {
            origin: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            base_level: level,
            daily_trend: 0.0,
            weekday_factors: [1.0; 7],
            sigma: 0.0,
        }
    }
}

impl ForecastModel for PretrainedSpendModel {
    fn extend_index(&self, start: NaiveDate, end: NaiveDate, horizon_days: u32) -> Vec<NaiveDate> {
        let stop = end + Duration::days(i64::from(horizon_days));
        let mut index = Vec::new();
        let mut date = start;
        while date <= stop {
            index.push(date);
            date += Duration::days(1);
        }
        index
    }

    fn predict(&self, index: &[NaiveDate]) -> Vec<ForecastPoint> {
        index
            .iter()
            .map(|&date| {
                let t = (date - self.origin).num_days() as f64;
                let weekday = date.weekday().num_days_from_monday() as usize;
                let yhat = (self.base_level + self.daily_trend * t) * self.weekday_factors[weekday];
                let band = BAND_SIGMAS * self.sigma;
                ForecastPoint {
                    date,
                    yhat,
                    yhat_lower: yhat - band,
                    yhat_upper: yhat + band,
                }
            })
            .collect()
    }
}
