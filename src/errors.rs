use thiserror::Error;

/// Error type that captures the failure modes of the ledger engine.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
    #[error("No exchange rate for currency {0}")]
    CurrencyMismatch(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}
