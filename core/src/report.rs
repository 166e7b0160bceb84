//! Tabular export of cluster summaries.

use crate::{error::AnalysisResult, segment::ClusterSummaryRow};

/// Render the cluster summary as CSV, one row per cluster in label
/// order. Money columns are rounded to cents.
pub fn cluster_report_csv(rows: &[ClusterSummaryRow]) -> AnalysisResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Customer_Count",
        "Total_Spending",
        "Avg_Spending",
        "Transaction_Count",
    ])?;
    for row in rows {
        writer.write_record([
            row.customer_count.to_string(),
            format!("{:.2}", row.total_spending_mean),
            format!("{:.2}", row.avg_spending_mean),
            format!("{:.2}", row.transaction_count_mean),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing report: {e}"))?;
    String::from_utf8(bytes).map_err(|e| anyhow::anyhow!("report not utf-8: {e}").into())
}
