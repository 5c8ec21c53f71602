use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kwiki_payments::{StripeConfig, StripeGateway};
use kwiki_worker::cli::{Cli, Command, ProcessDueTransfersArgs};
use kwiki_worker::processor::preview_due;
use kwiki_worker::{ProcessReport, SettlementProcessor};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kwiki_worker=info,kwiki_settlement=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::ProcessDueTransfers(args) => process_due_transfers(args).await,
    };

    match result {
        Ok(report) => {
            print_report(&report);
            if report.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Settlement command failed");
            ExitCode::FAILURE
        }
    }
}

async fn process_due_transfers(args: ProcessDueTransfersArgs) -> anyhow::Result<ProcessReport> {
    let date = args.date_or(chrono::Utc::now().date_naive());
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = kwiki_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;

    if args.dry_run {
        tracing::info!(%date, "Dry run: listing due transfers only");
        return preview_due(&pool, date)
            .await
            .context("Failed to list due transfers");
    }

    let stripe = StripeConfig::from_env().context("STRIPE_SECRET_KEY must be set")?;
    let gateway = StripeGateway::new(stripe).context("Failed to build Stripe client")?;
    let processor = SettlementProcessor::new(pool, Arc::new(gateway), args.retry_policy());
    processor
        .process_due(date)
        .await
        .context("Failed to process due transfers")
}

fn print_report(report: &ProcessReport) {
    for line in &report.transfers {
        let status = match &line.outcome {
            None => "due".to_string(),
            Some(Ok(gateway_id)) => format!("sent ({gateway_id})"),
            Some(Err(error)) => format!("failed ({error})"),
        };
        println!(
            "{}\t{} {}\t{}\t{}",
            line.transfer_id, line.amount, line.currency, line.destination, status
        );
    }
    if report.dry_run {
        println!("{} transfer(s) due", report.transfers.len());
    } else {
        println!("{} sent, {} failed", report.sent(), report.failed());
    }
}
