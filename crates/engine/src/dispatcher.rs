//! Evaluator set - ordered dispatch of rules to evaluators.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use riskgate_core::{Customer, MatchedRule, RiskRule, RuleRecord, TransactionInput};
use riskgate_store::TransactionHistory;

use crate::error::EngineResult;
use crate::evaluators::{
    AmountThresholdEvaluator, FrequencyEvaluator, MerchantCategoryEvaluator,
};
use crate::traits::RuleEvaluator;

/// Policy when an evaluator fails mid-pass (e.g. the history store is
/// unreachable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailPolicy {
    /// Abort the whole evaluation pass (SAFER - DEFAULT). A risk check
    /// that cannot run must not silently pass.
    #[default]
    FailClosed,

    /// Log and skip the failing rule, continue with the rest.
    FailOpen,
}

/// The registered evaluators, in dispatch order.
///
/// Registration order is configuration: for each rule the FIRST evaluator
/// whose `supports` returns true is consulted, exactly once, even if later
/// evaluators would also support the type. A rule no evaluator supports is
/// inert, not an error.
pub struct EvaluatorSet {
    evaluators: Vec<Arc<dyn RuleEvaluator>>,
    fail_policy: FailPolicy,
}

impl EvaluatorSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
            fail_policy: FailPolicy::FailClosed,
        }
    }

    /// The standard registration order: amount threshold, merchant
    /// category, frequency.
    pub fn standard(history: Arc<dyn TransactionHistory>) -> Self {
        let mut set = Self::new();
        set.register(Arc::new(AmountThresholdEvaluator::new()));
        set.register(Arc::new(MerchantCategoryEvaluator::new()));
        set.register(Arc::new(FrequencyEvaluator::new(history)));
        set
    }

    /// Set the fail policy.
    pub fn with_fail_policy(mut self, policy: FailPolicy) -> Self {
        self.fail_policy = policy;
        self
    }

    /// Append an evaluator to the dispatch order.
    pub fn register(&mut self, evaluator: Arc<dyn RuleEvaluator>) {
        self.evaluators.push(evaluator);
    }

    /// Number of registered evaluators.
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// Current fail policy.
    pub fn fail_policy(&self) -> FailPolicy {
        self.fail_policy
    }

    /// Evaluate the rule set against one candidate transaction.
    ///
    /// Rules are visited in the given (registry) order; the output match
    /// list preserves that order. Inactive rules and rules whose required
    /// parameters are absent are skipped silently, as are rules with no
    /// supporting evaluator.
    pub async fn evaluate_rules(
        &self,
        input: &TransactionInput,
        customer: &Customer,
        records: &[RuleRecord],
        evaluated_at: DateTime<Utc>,
    ) -> EngineResult<Vec<MatchedRule>> {
        let mut matches = Vec::new();

        for record in records {
            if !record.active {
                continue;
            }

            // Missing required parameters: the rule never matches.
            let Some(rule) = RiskRule::from_record(record) else {
                tracing::debug!(
                    rule = %record.name,
                    rule_type = %record.rule_type,
                    "Skipping rule with missing parameters"
                );
                continue;
            };

            let Some(evaluator) = self
                .evaluators
                .iter()
                .find(|e| e.supports(rule.rule_type()))
            else {
                tracing::debug!(
                    rule = %rule.name,
                    rule_type = %rule.rule_type(),
                    "No evaluator registered for rule type; rule is inert"
                );
                continue;
            };

            match evaluator.evaluate(input, customer, &rule, evaluated_at).await {
                Ok(Some(matched)) => {
                    tracing::debug!(
                        evaluator = evaluator.name(),
                        rule = %matched.rule_name,
                        points = matched.points,
                        "Rule matched"
                    );
                    matches.push(matched);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(
                        evaluator = evaluator.name(),
                        rule = %rule.name,
                        error = %e,
                        "Evaluator failed"
                    );
                    match self.fail_policy {
                        FailPolicy::FailClosed => return Err(e),
                        FailPolicy::FailOpen => {
                            tracing::warn!(
                                rule = %rule.name,
                                "FailOpen: skipping rule after evaluator failure"
                            );
                            continue;
                        }
                    }
                }
            }
        }

        Ok(matches)
    }
}

impl Default for EvaluatorSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use riskgate_core::{MerchantCategory, RiskProfile, RuleType, TransactionId};
    use riskgate_store::{
        MemoryTransactionStore, StoreError, StoredTransaction, TransactionPage, TransactionQuery,
    };
    use rust_decimal_macros::dec;

    fn test_customer() -> Customer {
        Customer::new("Test Customer", "test@example.com", "USA", RiskProfile::Low)
    }

    fn standard_set() -> EvaluatorSet {
        EvaluatorSet::standard(Arc::new(MemoryTransactionStore::new()))
    }

    #[test]
    fn test_standard_registration() {
        let set = standard_set();
        assert_eq!(set.len(), 3);
        assert_eq!(set.fail_policy(), FailPolicy::FailClosed);
    }

    #[tokio::test]
    async fn test_empty_rule_set_yields_no_matches() {
        let set = standard_set();
        let customer = test_customer();
        let input = TransactionInput::new(customer.id, dec!(50.00), "USD", "RETAIL");

        let matches = set
            .evaluate_rules(&input, &customer, &[], Utc::now())
            .await
            .unwrap();

        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_matches_preserve_registry_order() {
        let set = standard_set();
        let customer = test_customer();
        let input = TransactionInput::new(customer.id, dec!(15000.00), "USD", "GAMBLING");

        // Category rule deliberately listed before the amount rule.
        let records = vec![
            RuleRecord::merchant_category("Gambling", MerchantCategory::Gambling, 40),
            RuleRecord::amount_threshold("High Amount", dec!(10000), 50),
        ];

        let matches = set
            .evaluate_rules(&input, &customer, &records, Utc::now())
            .await
            .unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].rule_name, "Gambling");
        assert_eq!(matches[1].rule_name, "High Amount");
    }

    #[tokio::test]
    async fn test_inactive_rules_are_skipped() {
        let set = standard_set();
        let customer = test_customer();
        let input = TransactionInput::new(customer.id, dec!(15000.00), "USD", "RETAIL");

        let records = vec![RuleRecord::amount_threshold("High Amount", dec!(10000), 50).inactive()];

        let matches = set
            .evaluate_rules(&input, &customer, &records, Utc::now())
            .await
            .unwrap();

        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_rule_with_missing_parameters_never_matches() {
        let set = standard_set();
        let customer = test_customer();
        let input = TransactionInput::new(customer.id, dec!(999999.00), "USD", "RETAIL");

        let mut broken = RuleRecord::amount_threshold("Broken", dec!(10000), 50);
        broken.amount_threshold = None;

        let matches = set
            .evaluate_rules(&input, &customer, &[broken], Utc::now())
            .await
            .unwrap();

        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_rule_without_supporting_evaluator_is_inert() {
        // Only the amount evaluator registered; frequency rules are inert.
        let mut set = EvaluatorSet::new();
        set.register(Arc::new(AmountThresholdEvaluator::new()));

        let customer = test_customer();
        let input = TransactionInput::new(customer.id, dec!(15000.00), "USD", "RETAIL");

        let records = vec![
            RuleRecord::frequency("High Frequency", 0, 10, 30),
            RuleRecord::amount_threshold("High Amount", dec!(10000), 50),
        ];

        let matches = set
            .evaluate_rules(&input, &customer, &records, Utc::now())
            .await
            .unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule_name, "High Amount");
    }

    #[tokio::test]
    async fn test_first_supporting_evaluator_wins() {
        // Two evaluators support AMOUNT_THRESHOLD; only the first runs.
        struct ZeroPointsEvaluator;

        #[async_trait]
        impl RuleEvaluator for ZeroPointsEvaluator {
            fn name(&self) -> &str {
                "zero_points"
            }

            fn supports(&self, rule_type: RuleType) -> bool {
                rule_type == RuleType::AmountThreshold
            }

            async fn evaluate(
                &self,
                _input: &TransactionInput,
                _customer: &Customer,
                rule: &RiskRule,
                _evaluated_at: DateTime<Utc>,
            ) -> EngineResult<Option<MatchedRule>> {
                Ok(Some(MatchedRule::new(
                    rule.id,
                    rule.name.clone(),
                    RuleType::AmountThreshold,
                    0,
                    "always matches with zero points",
                )))
            }
        }

        let mut set = EvaluatorSet::new();
        set.register(Arc::new(ZeroPointsEvaluator));
        set.register(Arc::new(AmountThresholdEvaluator::new()));

        let customer = test_customer();
        let input = TransactionInput::new(customer.id, dec!(15000.00), "USD", "RETAIL");
        let records = vec![RuleRecord::amount_threshold("High Amount", dec!(10000), 50)];

        let matches = set
            .evaluate_rules(&input, &customer, &records, Utc::now())
            .await
            .unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].points, 0);
    }

    // History store that always fails, to exercise the fail policy.
    struct BrokenHistory;

    #[async_trait]
    impl TransactionHistory for BrokenHistory {
        async fn count_for_customer_after(
            &self,
            _customer_id: riskgate_core::CustomerId,
            _cutoff: DateTime<Utc>,
        ) -> Result<u64, StoreError> {
            Err(StoreError::not_found("history store unavailable"))
        }

        async fn persist(
            &self,
            _transaction: StoredTransaction,
        ) -> Result<TransactionId, StoreError> {
            Err(StoreError::not_found("history store unavailable"))
        }

        async fn get(
            &self,
            _id: TransactionId,
        ) -> Result<Option<StoredTransaction>, StoreError> {
            Err(StoreError::not_found("history store unavailable"))
        }

        async fn list_page(
            &self,
            _query: TransactionQuery,
        ) -> Result<TransactionPage, StoreError> {
            Err(StoreError::not_found("history store unavailable"))
        }
    }

    #[tokio::test]
    async fn test_fail_closed_aborts_on_evaluator_error() {
        let set = EvaluatorSet::standard(Arc::new(BrokenHistory));
        let customer = test_customer();
        let input = TransactionInput::new(customer.id, dec!(100.00), "USD", "RETAIL");
        let records = vec![RuleRecord::frequency("High Frequency", 3, 10, 30)];

        let result = set
            .evaluate_rules(&input, &customer, &records, Utc::now())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fail_open_skips_failing_rule() {
        let set = EvaluatorSet::standard(Arc::new(BrokenHistory))
            .with_fail_policy(FailPolicy::FailOpen);
        let customer = test_customer();
        let input = TransactionInput::new(customer.id, dec!(15000.00), "USD", "RETAIL");

        let records = vec![
            RuleRecord::frequency("High Frequency", 3, 10, 30),
            RuleRecord::amount_threshold("High Amount", dec!(10000), 50),
        ];

        let matches = set
            .evaluate_rules(&input, &customer, &records, Utc::now())
            .await
            .unwrap();

        // The broken frequency rule is skipped; the amount rule still runs.
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule_name, "High Amount");
    }
}
