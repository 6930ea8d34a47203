//! End-to-end submission pipeline tests against the in-memory stores.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use riskgate_core::{
    Customer, MerchantCategory, RiskProfile, RuleRecord, TransactionInput, TransactionStatus,
};
use riskgate_store::{
    CustomerStore, MemoryCustomerStore, MemoryRuleRegistry, MemoryTransactionStore, RuleRegistry,
    StoredTransaction, TransactionHistory, TransactionQuery,
};

use riskgate_service::{
    install_seed, AuditEvent, ManualClock, ServiceConfig, ServiceError, SubmissionService,
};

struct Harness {
    customers: Arc<MemoryCustomerStore>,
    rules: Arc<MemoryRuleRegistry>,
    history: Arc<MemoryTransactionStore>,
    clock: Arc<ManualClock>,
    service: Arc<SubmissionService>,
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn harness() -> Harness {
    let customers = Arc::new(MemoryCustomerStore::new());
    let rules = Arc::new(MemoryRuleRegistry::new());
    let history = Arc::new(MemoryTransactionStore::new());
    let clock = Arc::new(ManualClock::new(fixed_now()));

    let service = SubmissionService::new(
        customers.clone(),
        rules.clone(),
        history.clone(),
        clock.clone(),
        ServiceConfig::default(),
    )
    .unwrap();

    Harness {
        customers,
        rules,
        history,
        clock,
        service: Arc::new(service),
    }
}

async fn standard_rules(rules: &MemoryRuleRegistry) {
    rules
        .insert(RuleRecord::amount_threshold("High Amount", dec!(10000), 50))
        .await
        .unwrap();
    rules
        .insert(RuleRecord::merchant_category(
            "Gambling",
            MerchantCategory::Gambling,
            40,
        ))
        .await
        .unwrap();
    rules
        .insert(RuleRecord::frequency("High Frequency", 3, 10, 30))
        .await
        .unwrap();
}

async fn known_customer(customers: &MemoryCustomerStore) -> Customer {
    let customer = Customer::new("Test Customer", "test@example.com", "USA", RiskProfile::Low);
    customers.insert(customer.clone()).await.unwrap();
    customer
}

#[tokio::test]
async fn clean_transaction_is_approved_with_empty_matches() {
    let h = harness();
    standard_rules(&h.rules).await;
    let customer = known_customer(&h.customers).await;

    let outcome = h
        .service
        .submit(TransactionInput::new(customer.id, dec!(50.00), "USD", "RETAIL"))
        .await
        .unwrap();

    assert_eq!(outcome.decision.total_score, 0);
    assert_eq!(outcome.decision.status, TransactionStatus::Approved);
    assert!(outcome.decision.matched_rules.is_empty());
    assert_eq!(outcome.timestamp, fixed_now());

    let view = h.service.get_transaction(outcome.transaction_id).await.unwrap();
    assert_eq!(view.customer_email, "test@example.com");
    assert_eq!(view.merchant_category, MerchantCategory::Retail);
    assert_eq!(view.risk_score, 0);
    assert!(view.matched_rules.is_empty());
}

#[tokio::test]
async fn high_amount_gambling_is_flagged_with_both_matches() {
    let h = harness();
    standard_rules(&h.rules).await;
    let customer = known_customer(&h.customers).await;

    let outcome = h
        .service
        .submit(TransactionInput::new(
            customer.id,
            dec!(15000.00),
            "USD",
            "GAMBLING",
        ))
        .await
        .unwrap();

    assert_eq!(outcome.decision.total_score, 90);
    assert_eq!(outcome.decision.status, TransactionStatus::Flagged);
    assert_eq!(outcome.decision.matched_rules.len(), 2);
    assert_eq!(outcome.decision.matched_rules[0].rule_name, "High Amount");
    assert_eq!(
        outcome.decision.matched_rules[0].reason,
        "Transaction amount 15000.00 exceeds threshold 10000"
    );
    assert_eq!(outcome.decision.matched_rules[1].rule_name, "Gambling");
    assert_eq!(
        outcome.decision.matched_rules[1].reason,
        "High-risk merchant category: GAMBLING"
    );
}

#[tokio::test]
async fn unknown_customer_aborts_without_persisting() {
    let h = harness();
    standard_rules(&h.rules).await;

    let err = h
        .service
        .submit(TransactionInput::new(
            uuid::Uuid::new_v4(),
            dec!(50.00),
            "USD",
            "RETAIL",
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::CustomerNotFound(_)));

    let page = h
        .history
        .list_page(TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total_elements, 0);
}

#[tokio::test]
async fn invalid_category_is_rejected_and_audited() {
    let h = harness();
    standard_rules(&h.rules).await;
    let customer = known_customer(&h.customers).await;

    let err = h
        .service
        .submit(TransactionInput::new(customer.id, dec!(50.00), "USD", "casino"))
        .await
        .unwrap_err();

    assert!(err.is_bad_request());

    let page = h
        .history
        .list_page(TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total_elements, 0);

    let events = h.service.audit_events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], AuditEvent::SubmissionRejected { .. }));
}

#[tokio::test]
async fn non_positive_amount_is_rejected() {
    let h = harness();
    standard_rules(&h.rules).await;
    let customer = known_customer(&h.customers).await;

    for amount in [dec!(0), dec!(-10.00)] {
        let err = h
            .service
            .submit(TransactionInput::new(customer.id, amount, "USD", "RETAIL"))
            .await
            .unwrap_err();
        assert!(err.is_bad_request());
    }
}

#[tokio::test]
async fn frequency_rule_trips_once_window_count_exceeds_threshold() {
    let h = harness();
    standard_rules(&h.rules).await;
    let customer = known_customer(&h.customers).await;

    // Four prior transactions inside the 10 minute window.
    for i in 1..=4i64 {
        let stored = StoredTransaction::new(
            &customer,
            dec!(100.00),
            "USD",
            fixed_now() - Duration::minutes(i * 2),
            MerchantCategory::Retail,
            0,
            TransactionStatus::Approved,
            &[],
        )
        .unwrap();
        h.history.persist(stored).await.unwrap();
    }

    let outcome = h
        .service
        .submit(TransactionInput::new(customer.id, dec!(100.00), "USD", "RETAIL"))
        .await
        .unwrap();

    assert_eq!(outcome.decision.total_score, 30);
    assert_eq!(outcome.decision.status, TransactionStatus::Approved);
    assert_eq!(outcome.decision.matched_rules.len(), 1);
    assert_eq!(
        outcome.decision.matched_rules[0].reason,
        "Frequency threshold exceeded: 4 transactions in 10 minutes (threshold: 3)"
    );
}

#[tokio::test]
async fn frequency_window_excludes_older_transactions() {
    let h = harness();
    standard_rules(&h.rules).await;
    let customer = known_customer(&h.customers).await;

    // All prior activity is older than the window.
    for i in 1..=4i64 {
        let stored = StoredTransaction::new(
            &customer,
            dec!(100.00),
            "USD",
            fixed_now() - Duration::minutes(10 + i),
            MerchantCategory::Retail,
            0,
            TransactionStatus::Approved,
            &[],
        )
        .unwrap();
        h.history.persist(stored).await.unwrap();
    }

    let outcome = h
        .service
        .submit(TransactionInput::new(customer.id, dec!(100.00), "USD", "RETAIL"))
        .await
        .unwrap();

    assert!(outcome.decision.matched_rules.is_empty());
}

#[tokio::test]
async fn identical_submissions_at_fixed_time_decide_identically() {
    let h = harness();
    // No frequency rule here: prior submissions must not influence later ones.
    h.rules
        .insert(RuleRecord::amount_threshold("High Amount", dec!(10000), 50))
        .await
        .unwrap();
    h.rules
        .insert(RuleRecord::merchant_category(
            "Gambling",
            MerchantCategory::Gambling,
            40,
        ))
        .await
        .unwrap();
    let customer = known_customer(&h.customers).await;

    let input = TransactionInput::new(customer.id, dec!(15000.00), "USD", "GAMBLING");
    let first = h.service.submit(input.clone()).await.unwrap();
    let second = h.service.submit(input).await.unwrap();

    assert_eq!(first.decision, second.decision);
    assert_eq!(first.timestamp, second.timestamp);
    assert_ne!(first.transaction_id, second.transaction_id);
}

#[tokio::test]
async fn concurrent_submissions_for_one_customer_are_serialized() {
    let h = harness();
    // Threshold zero: any prior transaction in the window trips the rule.
    h.rules
        .insert(RuleRecord::frequency("Any Repeat", 0, 10, 30))
        .await
        .unwrap();
    let customer = known_customer(&h.customers).await;

    let a = {
        let service = h.service.clone();
        let input = TransactionInput::new(customer.id, dec!(10.00), "USD", "RETAIL");
        tokio::spawn(async move { service.submit(input).await })
    };
    let b = {
        let service = h.service.clone();
        let input = TransactionInput::new(customer.id, dec!(20.00), "USD", "RETAIL");
        tokio::spawn(async move { service.submit(input).await })
    };

    let first = a.await.unwrap().unwrap();
    let second = b.await.unwrap().unwrap();

    // Whichever ran second must have observed the first persist: exactly
    // one of the two submissions matches the repeat rule.
    let tripped = [&first, &second]
        .iter()
        .filter(|o| !o.decision.matched_rules.is_empty())
        .count();
    assert_eq!(tripped, 1);
}

#[tokio::test]
async fn retrieving_unknown_transaction_is_not_found() {
    let h = harness();

    let err = h
        .service
        .get_transaction(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::TransactionNotFound(_)));
}

#[tokio::test]
async fn listing_filters_by_status() {
    let h = harness();
    standard_rules(&h.rules).await;
    let customer = known_customer(&h.customers).await;

    h.service
        .submit(TransactionInput::new(customer.id, dec!(50.00), "USD", "RETAIL"))
        .await
        .unwrap();
    h.clock.advance(Duration::hours(1));
    h.service
        .submit(TransactionInput::new(
            customer.id,
            dec!(15000.00),
            "USD",
            "GAMBLING",
        ))
        .await
        .unwrap();

    let flagged = h
        .service
        .list_transactions(TransactionQuery::default().with_status(TransactionStatus::Flagged))
        .await
        .unwrap();
    assert_eq!(flagged.total_elements, 1);
    assert_eq!(flagged.content[0].risk_score, 90);
    assert_eq!(flagged.content[0].matched_rules.len(), 2);

    let all = h
        .service
        .list_transactions(TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(all.total_elements, 2);
    // Newest first.
    assert_eq!(all.content[0].status, TransactionStatus::Flagged);
}

#[tokio::test]
async fn incomplete_rule_is_rejected_as_bad_request() {
    let h = harness();

    let mut broken = RuleRecord::amount_threshold("Broken", dec!(10000), 50);
    broken.amount_threshold = None;

    let err = h.service.create_rule(broken).await.unwrap_err();
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn audit_trail_records_submissions() {
    let h = harness();
    standard_rules(&h.rules).await;
    let customer = known_customer(&h.customers).await;

    let outcome = h
        .service
        .submit(TransactionInput::new(
            customer.id,
            dec!(15000.00),
            "USD",
            "GAMBLING",
        ))
        .await
        .unwrap();

    let events = h.service.audit_events().await.unwrap();
    assert_eq!(events.len(), 2);
    match &events[0] {
        AuditEvent::TransactionSubmitted {
            transaction_id,
            risk_score,
            status,
            matched_rules,
            ..
        } => {
            assert_eq!(*transaction_id, outcome.transaction_id);
            assert_eq!(*risk_score, 90);
            assert_eq!(*status, TransactionStatus::Flagged);
            assert_eq!(matched_rules, &["High Amount", "Gambling"]);
        }
        other => panic!("unexpected audit event: {other:?}"),
    }
    match &events[1] {
        AuditEvent::TransactionFlagged {
            risk_score,
            matched_rule_count,
            ..
        } => {
            assert_eq!(*risk_score, 90);
            assert_eq!(*matched_rule_count, 2);
        }
        other => panic!("unexpected audit event: {other:?}"),
    }
}

#[tokio::test]
async fn seeded_customer_trips_frequency_on_next_submission() {
    let h = harness();
    install_seed(&*h.customers, &*h.rules, &*h.history, &*h.clock)
        .await
        .unwrap();

    let bob = h
        .customers
        .list()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Bob Johnson")
        .unwrap();

    let outcome = h
        .service
        .submit(TransactionInput::new(bob.id, dec!(100.00), "USD", "RETAIL"))
        .await
        .unwrap();

    assert_eq!(outcome.decision.matched_rules.len(), 1);
    assert_eq!(outcome.decision.matched_rules[0].rule_name, "High Frequency");
    assert_eq!(outcome.decision.total_score, 30);
    assert_eq!(outcome.decision.status, TransactionStatus::Approved);
}
