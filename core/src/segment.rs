//! Customer segmentation — seeded k-means over summary features.
//!
//! RULE: Nothing here may call a platform RNG. The k-means initializer
//! runs off a Pcg64Mcg seeded from config, so the same seed and the
//! same input always yield the same partition. Cluster labels carry no
//! meaning beyond grouping.

use crate::{
    aggregate::CustomerSummary,
    config::AnalysisConfig,
    error::{AnalysisError, AnalysisResult},
    types::AccountId,
};
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

/// Number of features per customer: total, average, count.
const FEATURE_DIM: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    pub account_id: AccountId,
    pub cluster: usize,
}

/// Per-cluster reporting row: member count plus the mean of each
/// feature over the cluster's members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummaryRow {
    pub cluster: usize,
    pub customer_count: u64,
    pub total_spending_mean: f64,
    pub avg_spending_mean: f64,
    pub transaction_count_mean: f64,
}

#[derive(Debug, Clone)]
pub struct Segmentation {
    pub assignments: Vec<ClusterAssignment>,
    /// One row per non-empty cluster, labels ascending.
    pub clusters: Vec<ClusterSummaryRow>,
}

/// Partition customers into `config.cluster_count` behavioral groups
/// by minimizing within-cluster variance of the unscaled feature
/// vectors (total_spending, avg_spending, transaction_count).
pub fn segment_customers(
    summaries: &[CustomerSummary],
    config: &AnalysisConfig,
) -> AnalysisResult<Segmentation> {
    let k = config.cluster_count;
    if summaries.len() < k {
        return Err(AnalysisError::InsufficientData {
            requested: k,
            available: summaries.len(),
        });
    }

    let n = summaries.len();
    let mut flat = Vec::with_capacity(n * FEATURE_DIM);
    for s in summaries {
        flat.push(s.total_spending);
        flat.push(s.avg_spending);
        flat.push(s.transaction_count as f64);
    }
    let features = Array2::from_shape_vec((n, FEATURE_DIM), flat)
        .map_err(|e| anyhow::anyhow!("feature matrix shape: {e}"))?;
    let targets: Array1<usize> = Array1::zeros(n);
    let dataset = Dataset::new(features, targets);

    let rng = Pcg64Mcg::seed_from_u64(config.kmeans_seed);
    let model = KMeans::params_with(k, rng, L2Dist)
        .max_n_iterations(config.kmeans_max_iters)
        .tolerance(config.kmeans_tolerance)
        .fit(&dataset)
        .map_err(|e| anyhow::anyhow!("k-means fit failed: {e}"))?;

    let labels = model.predict(&dataset);

    let assignments: Vec<ClusterAssignment> = summaries
        .iter()
        .zip(labels.iter())
        .map(|(s, &cluster)| ClusterAssignment {
            account_id: s.account_id.clone(),
            cluster,
        })
        .collect();

    let clusters = summarize_clusters(summaries, &assignments, k);

    log::debug!(
        "segmented {} customers into {} clusters (seed {})",
        n,
        clusters.len(),
        config.kmeans_seed
    );

    Ok(Segmentation {
        assignments,
        clusters,
    })
}

fn summarize_clusters(
    summaries: &[CustomerSummary],
    assignments: &[ClusterAssignment],
    k: usize,
) -> Vec<ClusterSummaryRow> {
    let mut counts = vec![0u64; k];
    let mut totals = vec![[0.0f64; FEATURE_DIM]; k];

    for (s, a) in summaries.iter().zip(assignments.iter()) {
        counts[a.cluster] += 1;
        totals[a.cluster][0] += s.total_spending;
        totals[a.cluster][1] += s.avg_spending;
        totals[a.cluster][2] += s.transaction_count as f64;
    }

    (0..k)
        .filter(|&cluster| counts[cluster] > 0)
        .map(|cluster| {
            let members = counts[cluster] as f64;
            ClusterSummaryRow {
                cluster,
                customer_count: counts[cluster],
                total_spending_mean: totals[cluster][0] / members,
                avg_spending_mean: totals[cluster][1] / members,
                transaction_count_mean: totals[cluster][2] / members,
            }
        })
        .collect()
}
