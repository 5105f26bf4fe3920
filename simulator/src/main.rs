//! Wallet Ledger Simulator
//!
//! Drives the ledger with concurrent transfer scenarios and audits the
//! result for lost updates, negative balances and leaked money.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_ledger::{LedgerConfig, LedgerService, StoreBackend};

mod controller;
mod metrics;
mod scenario;

use controller::SimulationController;
use scenario::{Scenario, ScenarioOverrides};

/// Wallet Ledger Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Concurrent load and fault simulator for the wallet ledger")]
struct Args {
    /// Scenario to run (contention, random, ring, fault)
    #[arg(short, long, default_value = "contention")]
    scenario: String,

    /// Store backend (memory, account-lock, unavailable); overrides LEDGER_STORE_BACKEND
    #[arg(short, long)]
    backend: Option<StoreBackend>,

    /// Number of accounts to open
    #[arg(long)]
    accounts: Option<usize>,

    /// Number of concurrent transfers
    #[arg(long)]
    transfers: Option<usize>,

    /// Amount per transfer, in minor units
    #[arg(long)]
    amount: Option<i64>,

    /// Opening balance per account, in minor units
    #[arg(long)]
    initial_balance: Option<i64>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,

    /// Print ledger metrics in Prometheus format when done
    #[arg(long)]
    metrics: bool,

    /// Print the resolved scenario as JSON and exit
    #[arg(long)]
    describe: bool,
}

fn init_tracing(config: &LedgerConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );

    if config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = LedgerConfig::from_env()?;
    if args.json_logs {
        config.json_logs = true;
    }

    init_tracing(&config);

    let scenario = Scenario::load(&args.scenario)?.with_overrides(&ScenarioOverrides {
        accounts: args.accounts,
        transfers: args.transfers,
        amount: args.amount,
        initial_balance: args.initial_balance,
    })?;

    if args.describe {
        println!("{}", serde_json::to_string_pretty(&scenario)?);
        return Ok(());
    }

    if let Some(backend) = scenario.backend.or(args.backend) {
        config.store_backend = backend;
    }

    info!("Starting Wallet Ledger Simulator");
    info!("Backend: {}", config.store_backend);
    info!(
        "Accounts: {}, transfers: {} x {}",
        scenario.accounts, scenario.transfers, scenario.amount
    );

    let service = LedgerService::from_config(&config);
    let mut controller = SimulationController::new(service.clone(), scenario, args.seed);

    controller.initialize()?;
    let started = std::time::Instant::now();
    controller.run().await?;
    let elapsed = started.elapsed();

    let metrics = controller.metrics().await;
    info!("Simulation complete in {:?}", elapsed);
    info!("Total transfers: {}", metrics.total_transfers);
    info!("Successful: {}", metrics.successful_transfers);
    info!("Failed: {}", metrics.failed_transfers);
    for (code, count) in &metrics.failures_by_code {
        info!("  {}: {}", code, count);
    }
    info!("Success rate: {:.2}%", metrics.success_rate() * 100.0);
    info!("Average latency: {}us", metrics.average_latency_us());
    info!("p99 latency: {}us", metrics.p99_latency_us());

    match controller.audit().await {
        Ok(report) => {
            info!(
                opening_supply = %report.opening_supply,
                closing_supply = ?report.closing_supply,
                accounts = report.balances.len(),
                "Audit passed"
            );
        }
        Err(e) => {
            error!(error = %e, "Audit failed");
            return Err(e);
        }
    }

    if args.metrics {
        println!("{}", service.metrics().to_prometheus());
    }

    Ok(())
}
