//! Single-lock in-memory store.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use wallet_common::{AccountId, LedgerError, Money, Result};

use super::{check_amount, not_found, LedgerStore};
use crate::account::{apply_transfer, Account};

/// In-memory store guarded by one mutex.
///
/// The lock is held for the whole of each operation, so every operation is
/// serialized against every other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn create(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.lock();
        match accounts.entry(account.id.clone()) {
            Entry::Occupied(entry) => Err(LedgerError::AccountAlreadyExists(entry.key().to_string())),
            Entry::Vacant(entry) => {
                debug!(account = %account.id, "Account stored");
                entry.insert(account);
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Result<Account> {
        self.accounts
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn fund(&self, id: &str, amount: Money) -> Result<Account> {
        let amount = check_amount(amount)?;
        let mut accounts = self.accounts.lock();
        let account = accounts.get_mut(id).ok_or_else(|| not_found(id))?;
        account.credit(amount)?;
        Ok(account.clone())
    }

    fn transfer(&self, from_id: &str, to_id: &str, amount: Money) -> Result<()> {
        let amount = check_amount(amount)?;
        let mut accounts = self.accounts.lock();

        let mut from = accounts.get(from_id).cloned().ok_or_else(|| not_found(from_id))?;
        let mut to = accounts.get(to_id).cloned().ok_or_else(|| not_found(to_id))?;
        if from_id == to_id {
            return Err(LedgerError::SelfTransfer(from_id.to_string()));
        }

        // Work on copies and commit both only once the transfer is known good.
        apply_transfer(&mut from, &mut to, amount)?;
        accounts.insert(from.id.clone(), from);
        accounts.insert(to.id.clone(), to);
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.lock().values().cloned().collect())
    }
}
