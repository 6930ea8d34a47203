//! RiskGate Store - collaborator contracts and in-memory implementations
//!
//! The scoring core treats storage as an external collaborator. This crate
//! defines the three contracts it consumes:
//!
//! - [`CustomerStore`] - customer lookup (read-only to the engine)
//! - [`RuleRegistry`] - the ordered set of configured risk rules
//! - [`TransactionHistory`] - rolling-window counts and decision persistence
//!
//! plus `std::sync::RwLock`-backed in-memory implementations suitable for
//! tests and the CLI.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryCustomerStore, MemoryRuleRegistry, MemoryTransactionStore};
pub use traits::{
    CustomerStore, RuleRegistry, StoredTransaction, TransactionHistory, TransactionPage,
    TransactionQuery,
};
