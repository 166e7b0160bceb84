use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("No transactions for account {account_id}, category {category}")]
    EmptySeries {
        account_id: String,
        category: String,
    },

    #[error("Cannot form {requested} clusters from {available} customers")]
    InsufficientData { requested: usize, available: usize },

    #[error("Forecast horizon of {days} days outside allowed range {min}-{max}")]
    InvalidHorizon { days: u32, min: u32, max: u32 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
