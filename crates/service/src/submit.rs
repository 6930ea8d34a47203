//! Submission orchestrator.
//!
//! Drives one transaction through the full pipeline: validate, resolve the
//! customer, parse the merchant category, stamp the submission time, run
//! the rule engine, decide, persist, audit. Submissions for the same
//! customer are serialized so the frequency window count and the persist
//! that follows it are atomic with respect to each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use riskgate_core::{
    Customer, CustomerId, MatchedRule, MerchantCategory, RuleRecord, TransactionId,
    TransactionInput, TransactionStatus,
};
use riskgate_engine::{EvaluatorSet, TransactionDecision};
use riskgate_store::{
    CustomerStore, RuleRegistry, StoredTransaction, TransactionHistory, TransactionPage,
    TransactionQuery,
};

use crate::audit::{AuditEvent, AuditLedger};
use crate::clock::Clock;
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// What the caller gets back from a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub transaction_id: TransactionId,
    pub timestamp: DateTime<Utc>,
    pub decision: TransactionDecision,
}

/// A stored transaction with its match list decoded for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    pub customer_email: String,
    pub amount: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub merchant_category: MerchantCategory,
    pub risk_score: u32,
    pub status: TransactionStatus,
    pub matched_rules: Vec<MatchedRule>,
}

impl TransactionView {
    fn from_stored(stored: StoredTransaction) -> Self {
        let matched_rules = stored.decoded_matches();
        Self {
            id: stored.id,
            customer_id: stored.customer_id,
            customer_email: stored.customer_email,
            amount: stored.amount,
            currency: stored.currency,
            timestamp: stored.timestamp,
            merchant_category: stored.merchant_category,
            risk_score: stored.risk_score,
            status: stored.status,
            matched_rules,
        }
    }
}

/// One page of decoded transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionListing {
    pub content: Vec<TransactionView>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl TransactionListing {
    fn from_page(page: TransactionPage) -> Self {
        Self {
            content: page.content.into_iter().map(TransactionView::from_stored).collect(),
            page: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        }
    }
}

pub struct SubmissionService {
    customers: Arc<dyn CustomerStore>,
    rules: Arc<dyn RuleRegistry>,
    history: Arc<dyn TransactionHistory>,
    evaluators: EvaluatorSet,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
    audit: Mutex<AuditLedger>,
    // One entry per customer that has ever submitted; entries are never
    // evicted, so the map is bounded by the customer population.
    customer_locks: Mutex<HashMap<CustomerId, Arc<Mutex<()>>>>,
}

impl SubmissionService {
    /// Wire up the service with the standard evaluator set.
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        rules: Arc<dyn RuleRegistry>,
        history: Arc<dyn TransactionHistory>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> ServiceResult<Self> {
        let evaluators =
            EvaluatorSet::standard(history.clone()).with_fail_policy(config.fail_policy);

        let audit = match &config.audit_ledger_path {
            Some(path) => AuditLedger::new(path)?,
            None => AuditLedger::in_memory(),
        };

        Ok(Self {
            customers,
            rules,
            history,
            evaluators,
            clock,
            config,
            audit: Mutex::new(audit),
            customer_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Replace the evaluator set. Test hook for exercising dispatch edge
    /// cases through the full pipeline.
    pub fn with_evaluator_set(mut self, evaluators: EvaluatorSet) -> Self {
        self.evaluators = evaluators;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Submit one transaction for risk evaluation.
    pub async fn submit(&self, input: TransactionInput) -> ServiceResult<SubmissionOutcome> {
        tracing::info!(
            customer_id = %input.customer_id,
            amount = %input.amount,
            category = %input.merchant_category,
            "Processing transaction submission"
        );

        if input.amount <= Decimal::ZERO {
            return self
                .reject(input.customer_id, "Transaction amount must be positive")
                .await;
        }

        let customer = self
            .customers
            .find(input.customer_id)
            .await?
            .ok_or(ServiceError::CustomerNotFound(input.customer_id))?;

        let merchant_category: MerchantCategory = match input.merchant_category.parse() {
            Ok(category) => category,
            Err(e) => {
                return self.reject(customer.id, format!("{e}")).await;
            }
        };

        // Hold the customer's lock across count-and-persist so a concurrent
        // submission cannot read a stale window count.
        let lock = self.customer_lock(customer.id).await;
        let _guard = lock.lock().await;

        let timestamp = self.clock.now();
        let records = self.rules.list_active().await?;
        tracing::debug!(rule_count = records.len(), "Evaluating active risk rules");

        let matches = self
            .evaluators
            .evaluate_rules(&input, &customer, &records, timestamp)
            .await?;
        let decision = TransactionDecision::from_matches(matches);

        if decision.is_flagged() {
            tracing::warn!(
                customer_id = %customer.id,
                score = decision.total_score,
                matched = decision.matched_rules.len(),
                "Transaction flagged for review"
            );
        } else {
            tracing::info!(
                customer_id = %customer.id,
                score = decision.total_score,
                "Transaction approved"
            );
        }

        let stored = StoredTransaction::new(
            &customer,
            input.amount,
            &input.currency,
            timestamp,
            merchant_category,
            decision.total_score,
            decision.status,
            &decision.matched_rules,
        )?;
        let transaction_id = self.history.persist(stored).await?;

        self.append_audit(AuditEvent::transaction_submitted(
            transaction_id,
            customer.id,
            decision.total_score,
            decision.status,
            decision
                .matched_rules
                .iter()
                .map(|m| m.rule_name.clone())
                .collect(),
            timestamp,
        ))
        .await;
        if decision.is_flagged() {
            self.append_audit(AuditEvent::transaction_flagged(
                transaction_id,
                customer.id,
                decision.total_score,
                decision.matched_rules.len(),
                timestamp,
            ))
            .await;
        } else {
            self.append_audit(AuditEvent::transaction_approved(
                transaction_id,
                customer.id,
                decision.total_score,
                timestamp,
            ))
            .await;
        }

        Ok(SubmissionOutcome {
            transaction_id,
            timestamp,
            decision,
        })
    }

    /// Fetch one stored transaction with its match list decoded.
    pub async fn get_transaction(&self, id: TransactionId) -> ServiceResult<TransactionView> {
        let stored = self
            .history
            .get(id)
            .await?
            .ok_or(ServiceError::TransactionNotFound(id))?;

        self.append_audit(AuditEvent::transaction_retrieved(id, self.clock.now()))
            .await;

        Ok(TransactionView::from_stored(stored))
    }

    /// Page through stored transactions, newest first.
    pub async fn list_transactions(
        &self,
        query: TransactionQuery,
    ) -> ServiceResult<TransactionListing> {
        let page = self.history.list_page(query).await?;
        Ok(TransactionListing::from_page(page))
    }

    pub async fn list_customers(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.customers.list().await?)
    }

    pub async fn create_customer(&self, customer: Customer) -> ServiceResult<CustomerId> {
        Ok(self.customers.insert(customer).await?)
    }

    pub async fn list_rules(&self) -> ServiceResult<Vec<RuleRecord>> {
        Ok(self.rules.list_all().await?)
    }

    /// Register a new rule. Incomplete parameter sets are rejected up
    /// front rather than soft-skipped at evaluation time.
    pub async fn create_rule(&self, record: RuleRecord) -> ServiceResult<riskgate_core::RuleId> {
        self.rules.insert(record).await.map_err(|e| match e {
            riskgate_store::StoreError::InvalidRule(msg) => ServiceError::BadRequest(msg),
            other => ServiceError::Store(other),
        })
    }

    pub async fn set_rule_active(
        &self,
        id: riskgate_core::RuleId,
        active: bool,
    ) -> ServiceResult<()> {
        Ok(self.rules.set_active(id, active).await?)
    }

    /// Audit events recorded so far. Only meaningful for the in-memory
    /// ledger; a file-backed ledger re-reads from disk.
    pub async fn audit_events(&self) -> ServiceResult<Vec<AuditEvent>> {
        self.audit.lock().await.read_all()
    }

    async fn reject(
        &self,
        customer_id: CustomerId,
        reason: impl Into<String>,
    ) -> ServiceResult<SubmissionOutcome> {
        let reason = reason.into();
        tracing::warn!(customer_id = %customer_id, reason = %reason, "Submission rejected");
        self.append_audit(AuditEvent::submission_rejected(
            customer_id,
            reason.clone(),
            self.clock.now(),
        ))
        .await;
        Err(ServiceError::BadRequest(reason))
    }

    async fn customer_lock(&self, id: CustomerId) -> Arc<Mutex<()>> {
        let mut locks = self.customer_locks.lock().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // Audit failures are logged, never surfaced: the decision has already
    // been made and persisted by the time the trail is written.
    async fn append_audit(&self, event: AuditEvent) {
        let mut audit = self.audit.lock().await;
        if let Err(e) = audit.append(&event) {
            tracing::error!(error = %e, "Failed to append audit event");
        }
    }
}
