//! spendscope-core — credit-card spend analysis.
//!
//! Pipeline: raw transaction table → normalizer → aggregator →
//! {segmentation engine, daily series} → forecast adapter → anomaly
//! detector. Presentation layers hand in an account id, a category
//! filter, and a horizon, and render the returned tables as-is; see
//! [`session::AnalysisSession`] for the query surface.

pub mod aggregate;
pub mod anomaly;
pub mod config;
pub mod error;
pub mod forecast;
pub mod normalize;
pub mod pretrained;
pub mod report;
pub mod segment;
pub mod session;
pub mod types;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use session::AnalysisSession;
