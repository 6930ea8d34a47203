//! Built-in rule evaluators:
//! - [`AmountThresholdEvaluator`] - amount strictly above a threshold
//! - [`MerchantCategoryEvaluator`] - exact match on a high-risk category
//! - [`FrequencyEvaluator`] - rolling-window transaction count

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use riskgate_core::{
    Customer, MatchedRule, MerchantCategory, RiskRule, RuleParams, RuleType, TransactionInput,
};
use riskgate_store::TransactionHistory;

use crate::error::EngineResult;
use crate::traits::RuleEvaluator;

// =============================================================================
// AmountThresholdEvaluator
// =============================================================================

/// Matches when the transaction amount strictly exceeds the rule threshold.
///
/// Equality does not match: a 10000.00 transaction against a 10000.00
/// threshold passes clean.
#[derive(Debug, Default)]
pub struct AmountThresholdEvaluator;

impl AmountThresholdEvaluator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuleEvaluator for AmountThresholdEvaluator {
    fn name(&self) -> &str {
        "amount_threshold"
    }

    fn supports(&self, rule_type: RuleType) -> bool {
        rule_type == RuleType::AmountThreshold
    }

    async fn evaluate(
        &self,
        input: &TransactionInput,
        _customer: &Customer,
        rule: &RiskRule,
        _evaluated_at: DateTime<Utc>,
    ) -> EngineResult<Option<MatchedRule>> {
        let RuleParams::AmountThreshold { threshold } = &rule.params else {
            return Ok(None);
        };

        if input.amount > *threshold {
            return Ok(Some(MatchedRule::new(
                rule.id,
                rule.name.clone(),
                RuleType::AmountThreshold,
                rule.risk_points,
                format!(
                    "Transaction amount {} exceeds threshold {}",
                    input.amount, threshold
                ),
            )));
        }

        Ok(None)
    }
}

// =============================================================================
// MerchantCategoryEvaluator
// =============================================================================

/// Matches when the input's merchant category equals the rule's category.
///
/// The raw input string is parsed case-sensitively; an unknown or
/// wrongly-cased category simply never matches.
#[derive(Debug, Default)]
pub struct MerchantCategoryEvaluator;

impl MerchantCategoryEvaluator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuleEvaluator for MerchantCategoryEvaluator {
    fn name(&self) -> &str {
        "merchant_category"
    }

    fn supports(&self, rule_type: RuleType) -> bool {
        rule_type == RuleType::MerchantCategory
    }

    async fn evaluate(
        &self,
        input: &TransactionInput,
        _customer: &Customer,
        rule: &RiskRule,
        _evaluated_at: DateTime<Utc>,
    ) -> EngineResult<Option<MatchedRule>> {
        let RuleParams::MerchantCategory { category } = &rule.params else {
            return Ok(None);
        };

        let Ok(input_category) = input.merchant_category.parse::<MerchantCategory>() else {
            return Ok(None);
        };

        if input_category == *category {
            return Ok(Some(MatchedRule::new(
                rule.id,
                rule.name.clone(),
                RuleType::MerchantCategory,
                rule.risk_points,
                format!("High-risk merchant category: {input_category}"),
            )));
        }

        Ok(None)
    }
}

// =============================================================================
// FrequencyEvaluator
// =============================================================================

/// Matches when the customer's transaction count inside the rolling window
/// strictly exceeds the configured maximum.
///
/// The window ends at the evaluation stamp and extends `window_minutes`
/// backward; the history count is strictly-after the cutoff. "More than X"
/// means `> X`: a count exactly at the threshold does not match.
pub struct FrequencyEvaluator {
    history: Arc<dyn TransactionHistory>,
}

impl FrequencyEvaluator {
    pub fn new(history: Arc<dyn TransactionHistory>) -> Self {
        Self { history }
    }
}

#[async_trait]
impl RuleEvaluator for FrequencyEvaluator {
    fn name(&self) -> &str {
        "frequency"
    }

    fn supports(&self, rule_type: RuleType) -> bool {
        rule_type == RuleType::Frequency
    }

    async fn evaluate(
        &self,
        _input: &TransactionInput,
        customer: &Customer,
        rule: &RiskRule,
        evaluated_at: DateTime<Utc>,
    ) -> EngineResult<Option<MatchedRule>> {
        let RuleParams::Frequency {
            max_count,
            window_minutes,
        } = &rule.params
        else {
            return Ok(None);
        };

        let cutoff = evaluated_at - Duration::minutes(*window_minutes);
        let count = self
            .history
            .count_for_customer_after(customer.id, cutoff)
            .await?;

        tracing::debug!(
            customer_id = %customer.id,
            count,
            window_minutes,
            threshold = max_count,
            "Rolling-window frequency check"
        );

        if count > *max_count {
            return Ok(Some(MatchedRule::new(
                rule.id,
                rule.name.clone(),
                RuleType::Frequency,
                rule.risk_points,
                format!(
                    "Frequency threshold exceeded: {count} transactions in {window_minutes} minutes (threshold: {max_count})"
                ),
            )));
        }

        Ok(None)
    }
}

// =============================================================================
// Tests
// =============================================================================
