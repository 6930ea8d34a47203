//! In-memory store implementations.
//!
//! Backed by `std::sync::RwLock` state; good enough for tests and the CLI.
//! The rule registry preserves insertion order, which is the evaluation
//! order seen by the dispatcher.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use riskgate_core::{Customer, CustomerId, RuleId, RuleRecord, TransactionId};

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    CustomerStore, RuleRegistry, StoredTransaction, TransactionHistory, TransactionPage,
    TransactionQuery,
};

// =============================================================================
// MemoryCustomerStore
// =============================================================================

/// In-memory customer store.
#[derive(Default)]
pub struct MemoryCustomerStore {
    customers: RwLock<Vec<Customer>>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.customers.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn find(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let customers = self.customers.read().unwrap();
        Ok(customers.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, customer: Customer) -> StoreResult<CustomerId> {
        let id = customer.id;
        self.customers.write().unwrap().push(customer);
        Ok(id)
    }

    async fn list(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.customers.read().unwrap().clone())
    }
}

// =============================================================================
// MemoryRuleRegistry
// =============================================================================

/// In-memory rule registry with insertion-order iteration.
#[derive(Default)]
pub struct MemoryRuleRegistry {
    rules: RwLock<Vec<RuleRecord>>,
}

impl MemoryRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Insert/update validation: the populated parameter set must match the
    // declared type. Records that would never evaluate are rejected here,
    // at configuration time, rather than silently skipped forever.
    fn validate(record: &RuleRecord) -> StoreResult<()> {
        if record.params().is_none() {
            return Err(StoreError::invalid_rule(format!(
                "{} rule '{}' is missing its required parameters",
                record.rule_type, record.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RuleRegistry for MemoryRuleRegistry {
    async fn list_active(&self) -> StoreResult<Vec<RuleRecord>> {
        let rules = self.rules.read().unwrap();
        Ok(rules.iter().filter(|r| r.active).cloned().collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<RuleRecord>> {
        Ok(self.rules.read().unwrap().clone())
    }

    async fn insert(&self, record: RuleRecord) -> StoreResult<RuleId> {
        Self::validate(&record)?;
        let id = record.id;
        self.rules.write().unwrap().push(record);
        Ok(id)
    }

    async fn update(&self, record: RuleRecord) -> StoreResult<()> {
        Self::validate(&record)?;
        let mut rules = self.rules.write().unwrap();
        match rules.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(StoreError::not_found(format!("rule {}", record.id))),
        }
    }

    async fn set_active(&self, id: RuleId, active: bool) -> StoreResult<()> {
        let mut rules = self.rules.write().unwrap();
        match rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.active = active;
                Ok(())
            }
            None => Err(StoreError::not_found(format!("rule {id}"))),
        }
    }
}

// =============================================================================
// MemoryTransactionStore
// =============================================================================

/// In-memory transaction history.
#[derive(Default)]
pub struct MemoryTransactionStore {
    transactions: RwLock<HashMap<TransactionId, StoredTransaction>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transactions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionHistory for MemoryTransactionStore {
    async fn count_for_customer_after(
        &self,
        customer_id: CustomerId,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let transactions = self.transactions.read().unwrap();
        // Strictly after the cutoff: a transaction at exactly the cutoff
        // instant is outside the window.
        let count = transactions
            .values()
            .filter(|t| t.customer_id == customer_id && t.timestamp > cutoff)
            .count();
        Ok(count as u64)
    }

    async fn persist(&self, transaction: StoredTransaction) -> StoreResult<TransactionId> {
        let id = transaction.id;
        self.transactions.write().unwrap().insert(id, transaction);
        Ok(id)
    }

    async fn get(&self, id: TransactionId) -> StoreResult<Option<StoredTransaction>> {
        Ok(self.transactions.read().unwrap().get(&id).cloned())
    }

    async fn list_page(&self, query: TransactionQuery) -> StoreResult<TransactionPage> {
        let transactions = self.transactions.read().unwrap();
        let search = query.search.as_ref().map(|s| s.to_lowercase());

        let mut filtered: Vec<StoredTransaction> = transactions
            .values()
            .filter(|t| query.status.map_or(true, |s| t.status == s))
            .filter(|t| {
                search
                    .as_ref()
                    .map_or(true, |q| t.customer_email.to_lowercase().contains(q))
            })
            .cloned()
            .collect();

        // Newest first
        filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let size = query.effective_size();
        let total_elements = filtered.len();
        let total_pages = total_elements.div_ceil(size);
        let content: Vec<StoredTransaction> = filtered
            .into_iter()
            .skip(query.page * size)
            .take(size)
            .collect();

        Ok(TransactionPage {
            content,
            page: query.page,
            size,
            total_elements,
            total_pages,
        })
    }
}
