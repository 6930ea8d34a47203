//! Service-level error taxonomy.
//!
//! `CustomerNotFound` and `BadRequest` are the two abort classes a caller
//! can trigger through input alone; everything else is infrastructure.

use thiserror::Error;

use riskgate_core::{CustomerId, TransactionId};
use riskgate_engine::EngineError;
use riskgate_store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CustomerNotFound(_) | Self::TransactionNotFound(_)
        )
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }
}
