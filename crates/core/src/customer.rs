//! Customer profile - read-only from the engine's perspective.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::RiskProfile;

/// Opaque customer identifier.
pub type CustomerId = Uuid;

/// A customer record, as supplied by the customer store.
///
/// The scoring engine never mutates customers; it only reads the profile
/// while evaluating a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub country: String,
    pub risk_profile: RiskProfile,
}

impl Customer {
    /// Create a new customer with a fresh id.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        country: impl Into<String>,
        risk_profile: RiskProfile,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            country: country.into(),
            risk_profile,
        }
    }
}
