//! Storage contracts consumed by the scoring core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use riskgate_core::{
    Customer, CustomerId, MatchedRule, MerchantCategory, RuleId, RuleRecord, TransactionId,
    TransactionStatus,
};

use crate::error::StoreResult;

/// Customer lookup and management.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Find a customer by id. `Ok(None)` means the customer does not exist.
    async fn find(&self, id: CustomerId) -> StoreResult<Option<Customer>>;

    /// Insert a new customer.
    async fn insert(&self, customer: Customer) -> StoreResult<CustomerId>;

    /// List all customers.
    async fn list(&self) -> StoreResult<Vec<Customer>>;
}

/// The configured rule set.
///
/// Iteration order of `list_active` is the evaluation order and is part of
/// system configuration; implementations must preserve insertion order.
#[async_trait]
pub trait RuleRegistry: Send + Sync {
    /// All active rules, in registry order.
    async fn list_active(&self) -> StoreResult<Vec<RuleRecord>>;

    /// All rules, active or not, in registry order.
    async fn list_all(&self) -> StoreResult<Vec<RuleRecord>>;

    /// Insert a new rule. Rejects records whose populated parameters do not
    /// match the declared rule type.
    async fn insert(&self, record: RuleRecord) -> StoreResult<RuleId>;

    /// Replace an existing rule, with the same validation as `insert`.
    async fn update(&self, record: RuleRecord) -> StoreResult<()>;

    /// Activate or deactivate a rule.
    async fn set_active(&self, id: RuleId, active: bool) -> StoreResult<()>;
}

/// Historical transactions: rolling-window counts and decision persistence.
#[async_trait]
pub trait TransactionHistory: Send + Sync {
    /// Count the customer's transactions with a timestamp strictly after
    /// `cutoff`.
    async fn count_for_customer_after(
        &self,
        customer_id: CustomerId,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<u64>;

    /// Persist a decided transaction, returning its stored id.
    async fn persist(&self, transaction: StoredTransaction) -> StoreResult<TransactionId>;

    /// Fetch a stored transaction by id.
    async fn get(&self, id: TransactionId) -> StoreResult<Option<StoredTransaction>>;

    /// Page through stored transactions, newest first.
    async fn list_page(&self, query: TransactionQuery) -> StoreResult<TransactionPage>;
}

/// A decided transaction as persisted by the submission pipeline.
///
/// The ordered match list is stored as a JSON string so the record stays
/// flat; decoding failures on read degrade to an empty list rather than
/// making the record unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    pub customer_email: String,
    pub amount: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub merchant_category: MerchantCategory,
    pub risk_score: u32,
    pub status: TransactionStatus,
    pub matched_rules_json: String,
}

impl StoredTransaction {
    /// Build a stored record, serializing the match list.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        customer: &Customer,
        amount: Decimal,
        currency: impl Into<String>,
        timestamp: DateTime<Utc>,
        merchant_category: MerchantCategory,
        risk_score: u32,
        status: TransactionStatus,
        matched_rules: &[MatchedRule],
    ) -> StoreResult<Self> {
        let matched_rules_json = serde_json::to_string(matched_rules)?;
        Ok(Self {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            customer_email: customer.email.clone(),
            amount,
            currency: currency.into(),
            timestamp,
            merchant_category,
            risk_score,
            status,
            matched_rules_json,
        })
    }

    /// Decode the stored match list.
    ///
    /// A corrupt or unreadable list degrades to empty: retrieval stays
    /// available even when the match payload is lost.
    pub fn decoded_matches(&self) -> Vec<MatchedRule> {
        if self.matched_rules_json.is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&self.matched_rules_json) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(
                    transaction_id = %self.id,
                    error = %e,
                    "Failed to decode stored match list; returning empty"
                );
                Vec::new()
            }
        }
    }
}

/// Query parameters for paged transaction listings.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    /// Zero-based page index.
    pub page: usize,
    /// Page size; 0 falls back to the default of 10.
    pub size: usize,
    /// Optional status filter.
    pub status: Option<TransactionStatus>,
    /// Case-insensitive substring match on the customer email.
    pub search: Option<String>,
}

impl TransactionQuery {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size,
            status: None,
            search: None,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Effective page size.
    pub fn effective_size(&self) -> usize {
        if self.size == 0 {
            10
        } else {
            self.size
        }
    }
}

/// One page of stored transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub content: Vec<StoredTransaction>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}
