pub mod contractor_service;
pub mod rollover_service;
pub mod status_service;
pub mod transaction_service;

pub use contractor_service::{ContractorService, WidgetCatalog};
pub use rollover_service::{RolloverReport, RolloverService};
pub use status_service::{CompleteOverrides, StatusOutcome, StatusService};
pub use transaction_service::{CreateOutcome, CreateTransaction, TransactionService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}
