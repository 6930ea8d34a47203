//! Application context - wires everything together.

use std::path::Path;
use std::sync::Arc;

use riskgate_core::Customer;
use riskgate_service::{
    install_seed, SeedSummary, ServiceConfig, SubmissionService, SystemClock,
};
use riskgate_store::{
    CustomerStore, MemoryCustomerStore, MemoryRuleRegistry, MemoryTransactionStore,
};

/// Wires the in-memory stores and the submission service together for one
/// CLI invocation.
pub struct AppContext {
    pub customers: Arc<MemoryCustomerStore>,
    pub rules: Arc<MemoryRuleRegistry>,
    pub history: Arc<MemoryTransactionStore>,
    pub service: SubmissionService,
}

impl AppContext {
    pub fn new(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        let customers = Arc::new(MemoryCustomerStore::new());
        let rules = Arc::new(MemoryRuleRegistry::new());
        let history = Arc::new(MemoryTransactionStore::new());

        let service = SubmissionService::new(
            customers.clone(),
            rules.clone(),
            history.clone(),
            Arc::new(SystemClock),
            config,
        )?;

        Ok(Self {
            customers,
            rules,
            history,
            service,
        })
    }

    /// Install the development fixture. No-op when data already exists.
    pub async fn seed(&self) -> anyhow::Result<SeedSummary> {
        let summary = install_seed(
            self.customers.as_ref(),
            self.rules.as_ref(),
            self.history.as_ref(),
            &SystemClock,
        )
        .await?;
        Ok(summary)
    }

    /// Resolve a customer by email.
    pub async fn customer_by_email(&self, email: &str) -> anyhow::Result<Customer> {
        self.customers
            .list()
            .await?
            .into_iter()
            .find(|c| c.email == email)
            .ok_or_else(|| anyhow::anyhow!("No customer with email {email}"))
    }
}
