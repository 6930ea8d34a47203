//! RiskGate Core - Domain types
//!
//! This crate contains the fundamental types used across RiskGate:
//! - `MerchantCategory`, `RiskProfile`, `TransactionStatus`: closed enumerations
//! - `Customer`: customer profile consumed read-only by the engine
//! - `RiskRule` / `RuleRecord`: typed and flat representations of a risk rule
//! - `TransactionInput` / `MatchedRule`: submission input and per-rule match

pub mod category;
pub mod customer;
pub mod rule;
pub mod transaction;

pub use category::{CategoryParseError, MerchantCategory, RiskProfile, TransactionStatus};
pub use customer::{Customer, CustomerId};
pub use rule::{RiskRule, RuleId, RuleParams, RuleRecord, RuleType};
pub use transaction::{MatchedRule, TransactionId, TransactionInput};
