//! Ledger service: the boundary consumed by callers.
//!
//! The service validates input shape and hands everything else to the store.
//! It never retries, and store errors pass through unchanged.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use wallet_common::{AccountId, LedgerError, Money, Result};

use crate::account::Account;
use crate::config::LedgerConfig;
use crate::metrics::LedgerMetrics;
use crate::store::LedgerStore;

/// Account and transfer operations over any [`LedgerStore`].
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    metrics: Arc<LedgerMetrics>,
}

impl LedgerService {
    /// Create a service over `store`.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            metrics: Arc::new(LedgerMetrics::new()),
        }
    }

    /// Create a service over a fresh store chosen by `config`.
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.store_backend.build())
    }

    /// Service metrics.
    pub fn metrics(&self) -> &LedgerMetrics {
        &self.metrics
    }

    /// Open an account with a zero balance.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub fn create_account(&self, id: &str, owner: &str) -> Result<Account> {
        let account = Account::open(AccountId::new(id)?, owner)?;

        match self.store.create(account.clone()) {
            Ok(()) => {
                self.metrics.account_created();
                info!(account = %account.id, "Account created");
                Ok(account)
            }
            Err(e) => Err(self.report("create_account", e)),
        }
    }

    /// Look up an account.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub fn get_account(&self, id: &str) -> Result<Account> {
        self.store
            .get(id)
            .map_err(|e| self.report("get_account", e))
    }

    /// Credit `amount` minor units and return the updated account.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub fn fund_account(&self, id: &str, amount: i64) -> Result<Account> {
        let amount = Money::from_minor_units(amount).map_err(|e| self.report("fund_account", e))?;

        // The store returns the snapshot from inside the credit's critical
        // section, so it cannot include anyone else's later write.
        match self.store.fund(id, amount) {
            Ok(account) => {
                self.metrics.fund_applied();
                info!(
                    account = %account.id,
                    amount = %amount,
                    balance = %account.balance,
                    "Account funded"
                );
                Ok(account)
            }
            Err(e) => Err(self.report("fund_account", e)),
        }
    }

    /// Move `amount` minor units from one account to another.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub fn transfer(&self, from_id: &str, to_id: &str, amount: i64) -> Result<()> {
        let amount = match Money::from_minor_units(amount) {
            Ok(amount) => amount,
            Err(e) => {
                self.metrics.transfer_failed(&e);
                return Err(self.report("transfer", e));
            }
        };

        match self.store.transfer(from_id, to_id, amount) {
            Ok(()) => {
                self.metrics.transfer_success(amount.minor_units());
                info!(from = from_id, to = to_id, amount = %amount, "Transfer applied");
                Ok(())
            }
            Err(e) => {
                self.metrics.transfer_failed(&e);
                Err(self.report("transfer", e))
            }
        }
    }

    /// Copies of every account.
    pub fn accounts(&self) -> Result<Vec<Account>> {
        self.store.accounts().map_err(|e| self.report("accounts", e))
    }

    /// Sum of all balances, for conservation audits.
    pub fn total_supply(&self) -> Result<i128> {
        Ok(self
            .accounts()?
            .iter()
            .map(|account| i128::from(account.balance.minor_units()))
            .sum())
    }

    /// Log a failure at the level its kind deserves and hand it back.
    fn report(&self, operation: &'static str, err: LedgerError) -> LedgerError {
        match &err {
            LedgerError::StoreUnavailable(_) => {
                if operation != "transfer" {
                    self.metrics.store_failure();
                }
                error!(operation, code = err.error_code(), error = %err, "Store failure");
            }
            _ => warn!(operation, code = err.error_code(), error = %err, "Operation rejected"),
        }
        err
    }
}
