//! Evaluator capability contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use riskgate_core::{Customer, MatchedRule, RiskRule, RuleType, TransactionInput};

use crate::error::EngineResult;

/// The capability contract every rule evaluator implements.
///
/// `supports` is a pure predicate; `evaluate` is pure for its own rule type
/// except the frequency variant, which reads historical counts. An
/// evaluator never errors over missing configuration or malformed
/// categorical input - both produce `Ok(None)`.
#[async_trait]
pub trait RuleEvaluator: Send + Sync {
    /// Evaluator name for logging/debugging.
    fn name(&self) -> &str;

    /// Whether this evaluator knows how to test the given rule type.
    fn supports(&self, rule_type: RuleType) -> bool;

    /// Test one rule against one candidate transaction.
    ///
    /// Returns `Ok(Some(_))` when the rule's condition holds, `Ok(None)`
    /// otherwise. `evaluated_at` is the server-assigned submission stamp;
    /// rolling windows are measured backward from it.
    async fn evaluate(
        &self,
        input: &TransactionInput,
        customer: &Customer,
        rule: &RiskRule,
        evaluated_at: DateTime<Utc>,
    ) -> EngineResult<Option<MatchedRule>>;
}
