//! Simulation scenarios.

use serde::{Deserialize, Serialize};
use wallet_ledger::StoreBackend;

/// A simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Number of accounts to open.
    pub accounts: usize,
    /// Opening balance of each account, in minor units.
    pub initial_balance: i64,
    /// Number of concurrent transfers to issue.
    pub transfers: usize,
    /// Amount of every transfer, in minor units.
    pub amount: i64,
    /// How transfers pick their accounts.
    pub pattern: TransferPattern,
    /// What the final audit must find.
    pub expectation: Expectation,
    /// Store backend forced by the scenario, if any.
    #[serde(skip)]
    pub backend: Option<StoreBackend>,
}

/// How transfers choose source and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPattern {
    /// Every transfer goes from the first account to the second.
    Contention,
    /// Random distinct pairs.
    Random,
    /// Account i pays account i + 1, wrapping around.
    Ring,
}

/// Conditions checked after the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expectation {
    /// Every transfer succeeds and balances match the arithmetic exactly.
    ExactBalances,
    /// Total supply is unchanged and nothing is negative.
    ConservedSupply,
    /// Every call fails with a store error.
    AllFail,
}

/// Overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverrides {
    pub accounts: Option<usize>,
    pub transfers: Option<usize>,
    pub amount: Option<i64>,
    pub initial_balance: Option<i64>,
}

impl Scenario {
    /// Load a scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "contention" => Ok(Self::contention()),
            "random" => Ok(Self::random()),
            "ring" => Ok(Self::ring()),
            "fault" => Ok(Self::fault()),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Apply command-line overrides and check the result is runnable.
    pub fn with_overrides(mut self, overrides: &ScenarioOverrides) -> anyhow::Result<Self> {
        if let Some(accounts) = overrides.accounts {
            self.accounts = accounts;
        }
        if let Some(transfers) = overrides.transfers {
            self.transfers = transfers;
        }
        if let Some(amount) = overrides.amount {
            self.amount = amount;
        }
        if let Some(initial_balance) = overrides.initial_balance {
            self.initial_balance = initial_balance;
        }

        if self.accounts < 2 {
            anyhow::bail!("scenario {} needs at least 2 accounts", self.name);
        }
        if self.initial_balance < 0 {
            anyhow::bail!("initial balance cannot be negative");
        }
        Ok(self)
    }

    /// Single hot pair: many transfers racing on one source account.
    fn contention() -> Self {
        Self {
            name: "contention".to_string(),
            description: "200 concurrent transfers of 100 from A to B".to_string(),
            accounts: 2,
            initial_balance: 100_000,
            transfers: 200,
            amount: 100,
            pattern: TransferPattern::Contention,
            expectation: Expectation::ExactBalances,
            backend: None,
        }
    }

    /// Random traffic across many accounts, some of it overdrawing.
    fn random() -> Self {
        Self {
            name: "random".to_string(),
            description: "Random transfers between accounts".to_string(),
            accounts: 16,
            initial_balance: 10_000,
            transfers: 5_000,
            amount: 750,
            pattern: TransferPattern::Random,
            expectation: Expectation::ConservedSupply,
            backend: None,
        }
    }

    /// Circular payments, which mix both lock orders.
    fn ring() -> Self {
        Self {
            name: "ring".to_string(),
            description: "Each account pays its neighbour".to_string(),
            accounts: 8,
            initial_balance: 5_000,
            transfers: 4_000,
            amount: 25,
            pattern: TransferPattern::Ring,
            expectation: Expectation::ConservedSupply,
            backend: None,
        }
    }

    /// Contention traffic against a store that is down.
    fn fault() -> Self {
        Self {
            name: "fault".to_string(),
            description: "Every operation hits an unavailable store".to_string(),
            accounts: 2,
            initial_balance: 0,
            transfers: 100,
            amount: 100,
            pattern: TransferPattern::Contention,
            expectation: Expectation::AllFail,
            backend: Some(StoreBackend::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_known_scenarios() {
        for name in ["contention", "random", "ring", "fault"] {
            assert_eq!(Scenario::load(name).unwrap().name, name);
        }
        assert!(Scenario::load("moon-landing").is_err());
    }

    #[test]
    fn test_overrides() {
        let scenario = Scenario::load("random")
            .unwrap()
            .with_overrides(&ScenarioOverrides {
                accounts: Some(4),
                transfers: Some(10),
                ..ScenarioOverrides::default()
            })
            .unwrap();
        assert_eq!(scenario.accounts, 4);
        assert_eq!(scenario.transfers, 10);

        let too_few = ScenarioOverrides {
            accounts: Some(1),
            ..ScenarioOverrides::default()
        };
        assert!(Scenario::load("ring").unwrap().with_overrides(&too_few).is_err());
    }
}
