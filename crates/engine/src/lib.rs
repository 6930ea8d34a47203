//! RiskGate Engine - rule evaluation, dispatch, and scoring
//!
//! The engine turns a candidate transaction plus the configured rule set
//! into a [`TransactionDecision`]:
//!
//! ```text
//! TransactionInput + Customer + [RuleRecord]
//!         │
//!         ▼
//! ┌──────────────────┐   first evaluator whose `supports`
//! │ EvaluatorSet     │──► matches the rule type is consulted,
//! │ (registry order) │   at most once per rule
//! └────────┬─────────┘
//!          │ Vec<MatchedRule> (registry order preserved)
//!          ▼
//! ┌──────────────────┐
//! │ Scoring          │──► sum of points; >= 70 → Flagged
//! └──────────────────┘
//! ```

pub mod dispatcher;
pub mod error;
pub mod evaluators;
pub mod scoring;
pub mod traits;

pub use dispatcher::{EvaluatorSet, FailPolicy};
pub use error::{EngineError, EngineResult};
pub use evaluators::{AmountThresholdEvaluator, FrequencyEvaluator, MerchantCategoryEvaluator};
pub use scoring::{TransactionDecision, FLAGGED_THRESHOLD};
pub use traits::RuleEvaluator;
