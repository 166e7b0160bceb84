//! Analysis configuration.
//!
//! Every knob that affects results is explicit here — nothing hides
//! behind library defaults. Clustering reproducibility in particular
//! depends on `kmeans_seed` and `kmeans_max_iters` staying fixed.

use crate::error::AnalysisResult;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Number of behavioral customer clusters (K).
    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,

    /// Seed for the k-means initializer. Same seed + same input
    /// must always produce the same partition.
    #[serde(default = "default_kmeans_seed")]
    pub kmeans_seed: u64,

    /// Iteration cap for k-means convergence.
    #[serde(default = "default_kmeans_max_iters")]
    pub kmeans_max_iters: u64,

    /// Convergence tolerance for k-means.
    #[serde(default = "default_kmeans_tolerance")]
    pub kmeans_tolerance: f64,

    /// Smallest forecast horizon a caller may request, in days.
    #[serde(default = "default_min_horizon")]
    pub min_horizon_days: u32,

    /// Largest forecast horizon a caller may request, in days.
    #[serde(default = "default_max_horizon")]
    pub max_horizon_days: u32,

    /// Residual threshold multiplier: a point is anomalous when
    /// |residual| exceeds this many standard deviations.
    #[serde(default = "default_anomaly_sigma")]
    pub anomaly_sigma: f64,
}

fn default_cluster_count() -> usize {
    4
}
fn default_kmeans_seed() -> u64 {
    42
}
fn default_kmeans_max_iters() -> u64 {
    300
}
fn default_kmeans_tolerance() -> f64 {
    1e-4
}
fn default_min_horizon() -> u32 {
    7
}
fn default_max_horizon() -> u32 {
    180
}
fn default_anomaly_sigma() -> f64 {
    3.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cluster_count: default_cluster_count(),
            kmeans_seed: default_kmeans_seed(),
            kmeans_max_iters: default_kmeans_max_iters(),
            kmeans_tolerance: default_kmeans_tolerance(),
            min_horizon_days: default_min_horizon(),
            max_horizon_days: default_max_horizon(),
            anomaly_sigma: default_anomaly_sigma(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &str) -> AnalysisResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
