//! Closed enumerations for merchant categories, customer tiers, and
//! transaction status.
//!
//! Merchant categories parse case-sensitively: the wire form is the exact
//! SCREAMING_SNAKE_CASE name (`"GAMBLING"` parses, `"gambling"` does not).
//! A failed parse is a recoverable error value, never a panic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Error returned when a raw merchant-category string does not name a
/// known category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown merchant category: {0}")]
pub struct CategoryParseError(pub String);

/// Merchant class of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MerchantCategory {
    Retail,
    Gambling,
    Crypto,
    Other,
}

impl MerchantCategory {
    /// Canonical wire/storage form of the category.
    pub fn code(&self) -> &'static str {
        match self {
            MerchantCategory::Retail => "RETAIL",
            MerchantCategory::Gambling => "GAMBLING",
            MerchantCategory::Crypto => "CRYPTO",
            MerchantCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for MerchantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for MerchantCategory {
    type Err = CategoryParseError;

    // Exact, case-sensitive match. No trimming, no case folding:
    // "gambling" is not a known category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RETAIL" => Ok(MerchantCategory::Retail),
            "GAMBLING" => Ok(MerchantCategory::Gambling),
            "CRYPTO" => Ok(MerchantCategory::Crypto),
            "OTHER" => Ok(MerchantCategory::Other),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

/// Customer risk tier, assigned at onboarding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskProfile {
    Low,
    Medium,
    High,
}

/// Final classification of a submitted transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Accepted without review.
    Approved,
    /// Requires manual review.
    Flagged,
}

impl TransactionStatus {
    pub fn is_flagged(&self) -> bool {
        matches!(self, TransactionStatus::Flagged)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, TransactionStatus::Approved)
    }
}
