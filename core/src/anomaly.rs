//! Residual-based anomaly detection on the historical overlap.
//!
//! Forecast rows are left-joined onto the actual series by date;
//! future-only forecast dates never enter the residual set. A
//! historical date the forecast missed gets the median of the actuals
//! as its prediction — a deliberate simplification carried over from
//! the original pipeline, not interpolation. The threshold is
//! recomputed on every call since it depends on the current forecast
//! and series selection.

use crate::{aggregate::DailySeries, forecast::ForecastPoint};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyRecord {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
    pub residual: f64,
    pub is_anomaly: bool,
}

/// Flag dates where |actual - predicted| exceeds `sigma_multiplier`
/// population standard deviations of the residuals.
pub fn detect_anomalies(
    series: &DailySeries,
    forecast: &[ForecastPoint],
    sigma_multiplier: f64,
) -> Vec<AnomalyRecord> {
    let predicted_by_date: HashMap<NaiveDate, f64> =
        forecast.iter().map(|p| (p.date, p.yhat)).collect();
    let fallback = series.median_amount();

    let mut records: Vec<AnomalyRecord> = series
        .points
        .iter()
        .map(|pt| {
            let predicted = predicted_by_date.get(&pt.date).copied().unwrap_or(fallback);
            AnomalyRecord {
                date: pt.date,
                actual: pt.amount,
                predicted,
                residual: pt.amount - predicted,
                is_anomaly: false,
            }
        })
        .collect();

    let residuals: Vec<f64> = records.iter().map(|r| r.residual).collect();
    let threshold = sigma_multiplier * population_std(&residuals);
    for record in &mut records {
        record.is_anomaly = record.residual.abs() > threshold;
    }

    let flagged = records.iter().filter(|r| r.is_anomaly).count();
    log::debug!(
        "anomaly pass: {} points, threshold {:.2}, {} flagged",
        records.len(),
        threshold,
        flagged
    );

    records
}

fn population_std(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return 0.0;
    }
    let n = vals.len() as f64;
    let mean = vals.iter().sum::<f64>() / n;
    let sq_diff: f64 = vals.iter().map(|v| (v - mean).powi(2)).sum();
    (sq_diff / n).sqrt()
}
