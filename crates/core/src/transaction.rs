//! Submission input and per-rule match result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::customer::CustomerId;
use crate::rule::{RuleId, RuleType};

/// Opaque identifier of a stored transaction.
pub type TransactionId = Uuid;

/// A candidate transaction, as submitted by the caller.
///
/// The merchant category arrives as a raw string; it is validated against
/// the closed enumeration by the submission pipeline, not here. There is no
/// caller-supplied timestamp: submissions are stamped server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub customer_id: CustomerId,
    pub amount: Decimal,
    pub currency: String,
    pub merchant_category: String,
}

impl TransactionInput {
    pub fn new(
        customer_id: CustomerId,
        amount: Decimal,
        currency: impl Into<String>,
        merchant_category: impl Into<String>,
    ) -> Self {
        Self {
            customer_id,
            amount,
            currency: currency.into(),
            merchant_category: merchant_category.into(),
        }
    }
}

/// The outcome of one rule whose condition held for a submission.
///
/// Immutable once produced; serialized as-is into the stored transaction's
/// match list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRule {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub rule_type: RuleType,
    pub points: u32,
    pub reason: String,
}

impl MatchedRule {
    pub fn new(
        rule_id: RuleId,
        rule_name: impl Into<String>,
        rule_type: RuleType,
        points: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            rule_name: rule_name.into(),
            rule_type,
            points,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_input_creation() {
        let customer_id = Uuid::new_v4();
        let input = TransactionInput::new(customer_id, dec!(50.00), "USD", "RETAIL");

        assert_eq!(input.customer_id, customer_id);
        assert_eq!(input.amount, dec!(50.00));
        assert_eq!(input.currency, "USD");
        assert_eq!(input.merchant_category, "RETAIL");
    }

    #[test]
    fn test_matched_rule_serde() {
        let matched = MatchedRule::new(
            Uuid::new_v4(),
            "High Amount",
            RuleType::AmountThreshold,
            50,
            "Transaction amount 15000.00 exceeds threshold 10000.00",
        );

        let json = serde_json::to_string(&matched).unwrap();
        assert!(json.contains("AMOUNT_THRESHOLD"));
        assert!(json.contains("High Amount"));

        let parsed: MatchedRule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, matched);
    }
}
