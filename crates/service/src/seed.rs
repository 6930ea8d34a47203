//! Development fixture: customers, rules, and a spread of historical
//! transactions. Skipped entirely when customers already exist.

use chrono::Duration;
use rust_decimal::Decimal;

use riskgate_core::{Customer, MatchedRule, MerchantCategory, RiskProfile, RuleRecord, RuleType, TransactionStatus};
use riskgate_store::{CustomerStore, RuleRegistry, StoredTransaction, TransactionHistory};

use crate::clock::Clock;
use crate::error::ServiceResult;

/// Counts of what the seed run created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub rules: usize,
    pub transactions: usize,
}

impl SeedSummary {
    /// A no-op run against an already-seeded store.
    pub fn skipped() -> Self {
        Self {
            customers: 0,
            rules: 0,
            transactions: 0,
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.customers == 0 && self.rules == 0 && self.transactions == 0
    }
}

/// Install the development fixture. Idempotent: a store that already has
/// customers is left untouched.
pub async fn install(
    customers: &dyn CustomerStore,
    rules: &dyn RuleRegistry,
    history: &dyn TransactionHistory,
    clock: &dyn Clock,
) -> ServiceResult<SeedSummary> {
    if !customers.list().await?.is_empty() {
        tracing::info!("Data already initialized, skipping seed");
        return Ok(SeedSummary::skipped());
    }

    tracing::info!("Initializing seed data");

    let john = Customer::new("John Doe", "john.doe@example.com", "USA", RiskProfile::Low);
    let jane = Customer::new(
        "Jane Smith",
        "jane.smith@example.com",
        "UK",
        RiskProfile::Medium,
    );
    let bob = Customer::new(
        "Bob Johnson",
        "bob.johnson@example.com",
        "Canada",
        RiskProfile::High,
    );

    customers.insert(john.clone()).await?;
    customers.insert(jane.clone()).await?;
    customers.insert(bob.clone()).await?;

    let high_amount = RuleRecord::amount_threshold("High Amount", Decimal::from(10_000), 50);
    let gambling = RuleRecord::merchant_category("Gambling", MerchantCategory::Gambling, 40);
    let frequency = RuleRecord::frequency("High Frequency", 3, 10, 30);

    let high_amount_id = rules.insert(high_amount).await?;
    let gambling_id = rules.insert(gambling).await?;
    rules.insert(frequency).await?;

    let now = clock.now();
    let mut seeded = Vec::new();

    // Routine retail activity, spread hourly.
    for i in 0..10i64 {
        seeded.push(StoredTransaction::new(
            &john,
            Decimal::new(5000, 2),
            "USD",
            now - Duration::hours(i),
            MerchantCategory::Retail,
            0,
            TransactionStatus::Approved,
            &[],
        )?);
    }

    // High amount alone stays below the review threshold.
    let high_amount_match = MatchedRule::new(
        high_amount_id,
        "High Amount",
        RuleType::AmountThreshold,
        50,
        "Transaction amount 12000.00 exceeds threshold 10000",
    );
    seeded.push(StoredTransaction::new(
        &jane,
        Decimal::new(1_200_000, 2),
        "USD",
        now - Duration::hours(5),
        MerchantCategory::Retail,
        50,
        TransactionStatus::Approved,
        &[high_amount_match.clone()],
    )?);

    let gambling_match = MatchedRule::new(
        gambling_id,
        "Gambling",
        RuleType::MerchantCategory,
        40,
        "High-risk merchant category: GAMBLING",
    );
    seeded.push(StoredTransaction::new(
        &jane,
        Decimal::new(50_000, 2),
        "USD",
        now - Duration::hours(3),
        MerchantCategory::Gambling,
        40,
        TransactionStatus::Approved,
        &[gambling_match.clone()],
    )?);

    // Both together cross the threshold.
    let big_match = MatchedRule::new(
        high_amount_id,
        "High Amount",
        RuleType::AmountThreshold,
        50,
        "Transaction amount 15000.00 exceeds threshold 10000",
    );
    seeded.push(StoredTransaction::new(
        &bob,
        Decimal::new(1_500_000, 2),
        "USD",
        now - Duration::hours(2),
        MerchantCategory::Gambling,
        90,
        TransactionStatus::Flagged,
        &[big_match, gambling_match],
    )?);

    // Crypto activity, all clean.
    for i in 0..5i64 {
        seeded.push(StoredTransaction::new(
            &john,
            Decimal::new(20_000, 2),
            "USD",
            now - Duration::minutes(30 + i * 5),
            MerchantCategory::Crypto,
            0,
            TransactionStatus::Approved,
            &[],
        )?);
    }

    // Four recent transactions in a tight window; the next submission for
    // this customer trips the frequency rule.
    let base = now - Duration::minutes(8);
    for i in 0..4i64 {
        seeded.push(StoredTransaction::new(
            &bob,
            Decimal::new(10_000, 2),
            "USD",
            base + Duration::minutes(i * 2),
            MerchantCategory::Retail,
            0,
            TransactionStatus::Approved,
            &[],
        )?);
    }

    seeded.push(StoredTransaction::new(
        &jane,
        Decimal::new(500_000, 2),
        "EUR",
        now - Duration::days(1),
        MerchantCategory::Other,
        0,
        TransactionStatus::Approved,
        &[],
    )?);
    seeded.push(StoredTransaction::new(
        &john,
        Decimal::new(999_999, 2),
        "USD",
        now - Duration::days(2),
        MerchantCategory::Retail,
        0,
        TransactionStatus::Approved,
        &[],
    )?);

    let transactions = seeded.len();
    for transaction in seeded {
        history.persist(transaction).await?;
    }

    tracing::info!(
        customers = 3,
        rules = 3,
        transactions,
        "Seed data initialization completed"
    );

    Ok(SeedSummary {
        customers: 3,
        rules: 3,
        transactions,
    })
}
