//! Engine errors

use riskgate_store::StoreError;
use thiserror::Error;

/// Errors from rule evaluation.
///
/// Missing rule parameters and unparseable categorical input are NOT errors;
/// they soft-skip the rule. Only external-read failures surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Store error during evaluation: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
