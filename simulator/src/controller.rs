//! Simulation controller.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{ensure, Context};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{info, warn};

use wallet_common::AccountId;
use wallet_ledger::LedgerService;

use crate::metrics::SimulationMetrics;
use crate::scenario::{Expectation, Scenario, TransferPattern};

/// Outcome of the post-run ledger audit.
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Sum of balances after provisioning.
    pub opening_supply: i128,
    /// Sum of balances after the run, if the store could be read.
    pub closing_supply: Option<i128>,
    /// Final balance per account, in provisioning order.
    pub balances: Vec<(String, i64)>,
}

/// Controls the simulation.
pub struct SimulationController {
    /// Ledger under test.
    service: LedgerService,
    /// Scenario being run.
    scenario: Scenario,
    /// Random number generator.
    rng: StdRng,
    /// Provisioned account ids.
    account_ids: Vec<String>,
    /// Accounts that could not be provisioned.
    setup_failures: usize,
    /// Supply after provisioning.
    opening_supply: i128,
    /// Simulation metrics.
    metrics: Arc<Mutex<SimulationMetrics>>,
}

impl SimulationController {
    /// Create a new simulation controller.
    pub fn new(service: LedgerService, scenario: Scenario, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            service,
            scenario,
            rng,
            account_ids: Vec::new(),
            setup_failures: 0,
            opening_supply: 0,
            metrics: Arc::new(Mutex::new(SimulationMetrics::new())),
        }
    }

    /// Open and fund the scenario's accounts.
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        info!(
            "Initializing simulation with {} accounts",
            self.scenario.accounts
        );

        for index in 0..self.scenario.accounts {
            let id = AccountId::generate().to_string();
            let owner = format!("Account {}", index);

            let provisioned = self.service.create_account(&id, &owner).and_then(|account| {
                if self.scenario.initial_balance > 0 {
                    self.service
                        .fund_account(account.id.as_str(), self.scenario.initial_balance)
                } else {
                    Ok(account)
                }
            });

            match provisioned {
                Ok(account) => info!("Opened {} ({}) with {}", account.id, owner, account.balance),
                Err(e) if self.scenario.expectation == Expectation::AllFail => {
                    warn!(error = %e, "Provisioning failed as expected");
                    self.setup_failures += 1;
                }
                Err(e) => return Err(e).context(format!("failed to provision {}", owner)),
            }

            self.account_ids.push(id);
        }

        if self.setup_failures == 0 {
            self.opening_supply = self.service.total_supply()?;
        }

        Ok(())
    }

    /// Pick (from, to) account indices for every transfer.
    fn plan(&mut self) -> Vec<(usize, usize)> {
        let count = self.account_ids.len();

        (0..self.scenario.transfers)
            .map(|i| match self.scenario.pattern {
                TransferPattern::Contention => (0, 1),
                TransferPattern::Ring => (i % count, (i + 1) % count),
                TransferPattern::Random => {
                    let from = self.rng.gen_range(0..count);
                    let mut to = self.rng.gen_range(0..count);
                    while to == from {
                        to = self.rng.gen_range(0..count);
                    }
                    (from, to)
                }
            })
            .collect()
    }

    /// Issue every transfer concurrently and wait for all of them.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!(
            "Running scenario: {} - {}",
            self.scenario.name, self.scenario.description
        );

        let amount = self.scenario.amount;
        let tasks: Vec<_> = self
            .plan()
            .into_iter()
            .map(|(from, to)| {
                let service = self.service.clone();
                let metrics = Arc::clone(&self.metrics);
                let from_id = self.account_ids[from].clone();
                let to_id = self.account_ids[to].clone();

                tokio::spawn(async move {
                    let started = Instant::now();
                    let result = service.transfer(&from_id, &to_id, amount);
                    let latency = started.elapsed();

                    let mut metrics = metrics.lock().await;
                    match result {
                        Ok(()) => metrics.record_success(latency),
                        Err(e) => metrics.record_failure(e.error_code()),
                    }
                })
            })
            .collect();

        for joined in join_all(tasks).await {
            joined.context("transfer task panicked")?;
        }

        Ok(())
    }

    /// Check the ledger against the scenario's expectation.
    pub async fn audit(&self) -> anyhow::Result<AuditReport> {
        let metrics = self.metrics().await;

        if self.scenario.expectation == Expectation::AllFail {
            let store_failures = metrics
                .failures_by_code
                .get("STORE_UNAVAILABLE")
                .copied()
                .unwrap_or(0);
            ensure!(
                metrics.successful_transfers == 0,
                "{} transfers succeeded against a failing store",
                metrics.successful_transfers
            );
            ensure!(
                store_failures == metrics.total_transfers,
                "expected only store failures, got {:?}",
                metrics.failures_by_code
            );
            ensure!(
                self.setup_failures == self.account_ids.len(),
                "provisioning succeeded against a failing store"
            );
            return Ok(AuditReport {
                opening_supply: 0,
                closing_supply: None,
                balances: Vec::new(),
            });
        }

        let mut balances = Vec::with_capacity(self.account_ids.len());
        for id in &self.account_ids {
            let account = self.service.get_account(id)?;
            ensure!(
                account.balance.minor_units() >= 0,
                "account {} went negative",
                id
            );
            balances.push((id.clone(), account.balance.minor_units()));
        }

        let closing_supply = self.service.total_supply()?;
        ensure!(
            closing_supply == self.opening_supply,
            "supply changed from {} to {}",
            self.opening_supply,
            closing_supply
        );

        if self.scenario.expectation == Expectation::ExactBalances {
            let scenario = &self.scenario;
            // Only as many transfers as the source can cover may succeed.
            let affordable = (scenario.initial_balance / scenario.amount.max(1)) as u64;
            let expected_successes = affordable.min(scenario.transfers as u64);
            let moved = expected_successes as i64 * scenario.amount;

            ensure!(
                metrics.successful_transfers == expected_successes,
                "expected {} successful transfers, saw {}",
                expected_successes,
                metrics.successful_transfers
            );
            ensure!(
                balances[0].1 == scenario.initial_balance - moved
                    && balances[1].1 == scenario.initial_balance + moved,
                "expected balances {} / {}, found {} / {}",
                scenario.initial_balance - moved,
                scenario.initial_balance + moved,
                balances[0].1,
                balances[1].1
            );
        }

        Ok(AuditReport {
            opening_supply: self.opening_supply,
            closing_supply: Some(closing_supply),
            balances,
        })
    }

    /// Get simulation metrics.
    pub async fn metrics(&self) -> SimulationMetrics {
        self.metrics.lock().await.clone()
    }
}
