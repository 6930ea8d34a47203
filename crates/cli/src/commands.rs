//! Command implementations - one function per subcommand.

use rust_decimal::Decimal;
use uuid::Uuid;

use riskgate_core::{TransactionInput, TransactionStatus};
use riskgate_service::TransactionView;
use riskgate_store::TransactionQuery;

use crate::context::AppContext;

pub async fn seed(ctx: &AppContext) -> anyhow::Result<()> {
    let summary = ctx.seed().await?;
    if summary.was_skipped() {
        println!("Data already initialized, nothing to do");
    } else {
        println!(
            "✅ Seeded {} customers, {} rules, {} transactions",
            summary.customers, summary.rules, summary.transactions
        );
    }
    Ok(())
}

pub async fn customers(ctx: &AppContext) -> anyhow::Result<()> {
    let customers = ctx.service.list_customers().await?;
    println!("{} customer(s)", customers.len());
    for c in customers {
        println!("  {}  {:<20} {:<28} {:<8} {}", c.id, c.name, c.email, c.country, c.risk_profile);
    }
    Ok(())
}

pub async fn rules(ctx: &AppContext) -> anyhow::Result<()> {
    let rules = ctx.service.list_rules().await?;
    println!("{} rule(s)", rules.len());
    for r in rules {
        let state = if r.active { "active" } else { "inactive" };
        println!(
            "  {}  {:<16} {:<18} {:>3} pts  [{}]",
            r.id, r.name, r.rule_type, r.risk_points, state
        );
    }
    Ok(())
}

pub async fn submit(
    ctx: &AppContext,
    email: &str,
    amount: Decimal,
    currency: &str,
    category: &str,
) -> anyhow::Result<()> {
    let customer = ctx.customer_by_email(email).await?;
    let outcome = ctx
        .service
        .submit(TransactionInput::new(customer.id, amount, currency, category))
        .await?;

    let marker = if outcome.decision.is_flagged() { "🚩" } else { "✅" };
    println!(
        "{} {}  score {}  ({})",
        marker, outcome.decision.status, outcome.decision.total_score, outcome.transaction_id
    );
    for m in &outcome.decision.matched_rules {
        println!("   +{} {}: {}", m.points, m.rule_name, m.reason);
    }
    Ok(())
}

pub async fn show(ctx: &AppContext, id: Uuid) -> anyhow::Result<()> {
    let view = ctx.service.get_transaction(id).await?;
    print_view(ctx, &view);
    for m in &view.matched_rules {
        println!("   +{} {}: {}", m.points, m.rule_name, m.reason);
    }
    Ok(())
}

pub async fn list(
    ctx: &AppContext,
    page: usize,
    size: usize,
    status: Option<TransactionStatus>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let mut query = TransactionQuery::new(page, size);
    query.status = status;
    query.search = search;

    let listing = ctx.service.list_transactions(query).await?;
    println!(
        "page {}/{} ({} total)",
        listing.page + 1,
        listing.total_pages.max(1),
        listing.total_elements
    );
    for view in &listing.content {
        print_view(ctx, view);
    }
    Ok(())
}

fn print_view(ctx: &AppContext, view: &TransactionView) {
    let local = ctx.service.config().display_time(view.timestamp);
    println!(
        "  {}  {}  {:>12} {}  {:<8}  score {:>3}  {}  {}",
        view.id,
        local.format("%Y-%m-%d %H:%M"),
        view.amount,
        view.currency,
        view.merchant_category,
        view.risk_score,
        view.status,
        view.customer_email
    );
}
