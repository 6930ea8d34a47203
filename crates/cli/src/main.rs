//! RiskGate CLI - main entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

use riskgate_cli::{commands, AppContext};
use riskgate_core::TransactionStatus;

#[derive(Parser)]
#[command(name = "riskgate")]
#[command(about = "RiskGate - Transaction risk scoring", long_about = None)]
struct Cli {
    /// Optional service configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the development fixture
    Seed,

    /// List customers
    Customers,

    /// List risk rules
    Rules,

    /// Submit a transaction for risk evaluation
    Submit {
        /// Customer email
        customer: String,
        /// Transaction amount
        amount: Decimal,
        /// Merchant category (RETAIL, GAMBLING, CRYPTO, OTHER)
        category: String,
        /// Currency code
        #[arg(long, default_value = "USD")]
        currency: String,
    },

    /// Show one stored transaction
    Show {
        /// Transaction ID
        id: Uuid,
    },

    /// List stored transactions, newest first
    List {
        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: usize,
        /// Page size
        #[arg(long, default_value = "10")]
        size: usize,
        /// Filter by status (APPROVED or FLAGGED)
        #[arg(long)]
        status: Option<TransactionStatus>,
        /// Filter by customer email substring
        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Seed => {
            commands::seed(&ctx).await?;
        }

        command => {
            // The stores live in this process only, so every other command
            // starts from the fixture.
            ctx.seed().await?;

            match command {
                Commands::Seed => unreachable!(),

                Commands::Customers => commands::customers(&ctx).await?,

                Commands::Rules => commands::rules(&ctx).await?,

                Commands::Submit {
                    customer,
                    amount,
                    category,
                    currency,
                } => {
                    commands::submit(&ctx, &customer, amount, &currency, &category).await?;
                }

                Commands::Show { id } => commands::show(&ctx, id).await?,

                Commands::List {
                    page,
                    size,
                    status,
                    search,
                } => {
                    commands::list(&ctx, page, size, status, search).await?;
                }
            }
        }
    }

    Ok(())
}
