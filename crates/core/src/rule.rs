//! Risk rules - flat registry records and their typed form.
//!
//! Rules live in the registry as flat [`RuleRecord`]s (every type-specific
//! parameter optional, matching the persisted shape). The engine works on
//! [`RiskRule`], whose [`RuleParams`] sum type makes "parameters required
//! for this type" impossible to get wrong at compile time. A record whose
//! required parameter is absent converts to no typed rule at all; the
//! evaluation pass skips it silently instead of erroring.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::category::MerchantCategory;

/// Opaque rule identifier.
pub type RuleId = Uuid;

/// Closed enumeration of rule types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    AmountThreshold,
    MerchantCategory,
    Frequency,
}

/// Flat rule representation, as stored in the rule registry.
///
/// Only the parameters relevant to `rule_type` are expected to be populated;
/// use [`RuleRecord::params`] to obtain the validated typed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: RuleId,
    pub name: String,
    pub rule_type: RuleType,

    // AMOUNT_THRESHOLD rules
    pub amount_threshold: Option<Decimal>,

    // MERCHANT_CATEGORY rules
    pub merchant_category: Option<MerchantCategory>,

    // FREQUENCY rules (used together)
    pub frequency_count: Option<u64>,
    pub frequency_window_minutes: Option<i64>,

    pub risk_points: u32,
    pub active: bool,
}

impl RuleRecord {
    /// Create an AMOUNT_THRESHOLD rule record.
    pub fn amount_threshold(name: impl Into<String>, threshold: Decimal, points: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rule_type: RuleType::AmountThreshold,
            amount_threshold: Some(threshold),
            merchant_category: None,
            frequency_count: None,
            frequency_window_minutes: None,
            risk_points: points,
            active: true,
        }
    }

    /// Create a MERCHANT_CATEGORY rule record.
    pub fn merchant_category(
        name: impl Into<String>,
        category: MerchantCategory,
        points: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rule_type: RuleType::MerchantCategory,
            amount_threshold: None,
            merchant_category: Some(category),
            frequency_count: None,
            frequency_window_minutes: None,
            risk_points: points,
            active: true,
        }
    }

    /// Create a FREQUENCY rule record.
    pub fn frequency(
        name: impl Into<String>,
        max_count: u64,
        window_minutes: i64,
        points: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rule_type: RuleType::Frequency,
            amount_threshold: None,
            merchant_category: None,
            frequency_count: Some(max_count),
            frequency_window_minutes: Some(window_minutes),
            risk_points: points,
            active: true,
        }
    }

    /// Mark the record inactive (builder style).
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Extract the typed parameters for this record's declared type.
    ///
    /// Returns `None` when the required parameter(s) are absent. Missing
    /// configuration is a soft condition: such a rule simply never matches.
    pub fn params(&self) -> Option<RuleParams> {
        match self.rule_type {
            RuleType::AmountThreshold => self
                .amount_threshold
                .map(|threshold| RuleParams::AmountThreshold { threshold }),
            RuleType::MerchantCategory => self
                .merchant_category
                .map(|category| RuleParams::MerchantCategory { category }),
            RuleType::Frequency => match (self.frequency_count, self.frequency_window_minutes) {
                (Some(max_count), Some(window_minutes)) => Some(RuleParams::Frequency {
                    max_count,
                    window_minutes,
                }),
                _ => None,
            },
        }
    }
}

/// Type-specific rule parameters.
///
/// Each variant carries exactly the state its evaluator needs.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleParams {
    AmountThreshold { threshold: Decimal },
    MerchantCategory { category: MerchantCategory },
    Frequency { max_count: u64, window_minutes: i64 },
}

impl RuleParams {
    /// The rule type these parameters belong to.
    pub fn rule_type(&self) -> RuleType {
        match self {
            RuleParams::AmountThreshold { .. } => RuleType::AmountThreshold,
            RuleParams::MerchantCategory { .. } => RuleType::MerchantCategory,
            RuleParams::Frequency { .. } => RuleType::Frequency,
        }
    }
}

/// A fully validated rule, ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRule {
    pub id: RuleId,
    pub name: String,
    pub risk_points: u32,
    pub params: RuleParams,
}

impl RiskRule {
    /// Build a typed rule from a flat registry record.
    ///
    /// Returns `None` when the record's required parameters are absent.
    pub fn from_record(record: &RuleRecord) -> Option<Self> {
        let params = record.params()?;
        Some(Self {
            id: record.id,
            name: record.name.clone(),
            risk_points: record.risk_points,
            params,
        })
    }

    pub fn rule_type(&self) -> RuleType {
        self.params.rule_type()
    }
}
