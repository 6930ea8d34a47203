//! Score aggregation and status decision.

use serde::{Deserialize, Serialize};

use riskgate_core::{MatchedRule, TransactionStatus};

/// Total score at or above this value flags the transaction for manual
/// review. System-wide constant, deliberately not configurable per rule.
pub const FLAGGED_THRESHOLD: u32 = 70;

/// The outcome of one submission: the ordered matches, their point sum,
/// and the resulting classification.
///
/// Created once per submission and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDecision {
    pub matched_rules: Vec<MatchedRule>,
    pub total_score: u32,
    pub status: TransactionStatus,
}

impl TransactionDecision {
    /// Aggregate a match list into a decision.
    ///
    /// Score is the sum of match points (zero for an empty list); the
    /// boundary is inclusive on the flagged side: exactly
    /// [`FLAGGED_THRESHOLD`] is Flagged.
    pub fn from_matches(matched_rules: Vec<MatchedRule>) -> Self {
        let total_score: u32 = matched_rules.iter().map(|m| m.points).sum();
        let status = if total_score >= FLAGGED_THRESHOLD {
            TransactionStatus::Flagged
        } else {
            TransactionStatus::Approved
        };

        Self {
            matched_rules,
            total_score,
            status,
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.status.is_flagged()
    }

    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }
}
