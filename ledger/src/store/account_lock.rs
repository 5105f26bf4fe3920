//! Per-account lock store.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use wallet_common::{AccountId, LedgerError, Money, Result};

use super::{check_amount, not_found, LedgerStore};
use crate::account::{apply_transfer, Account};

/// In-memory store with one lock per account.
///
/// Operations on disjoint accounts run in parallel. Whenever more than one
/// account lock is needed they are taken in ascending id order, which rules
/// out deadlock between a transfer and its mirror-direction twin.
#[derive(Debug, Default)]
pub struct AccountLockStore {
    accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
}

impl AccountLockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock cell for an account. The map shard is released on return.
    fn slot(&self, id: &str) -> Result<Arc<Mutex<Account>>> {
        self.accounts
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| not_found(id))
    }
}

impl LedgerStore for AccountLockStore {
    fn name(&self) -> &'static str {
        "account-lock"
    }

    fn create(&self, account: Account) -> Result<()> {
        match self.accounts.entry(account.id.clone()) {
            Entry::Occupied(entry) => Err(LedgerError::AccountAlreadyExists(entry.key().to_string())),
            Entry::Vacant(entry) => {
                debug!(account = %account.id, "Account stored");
                entry.insert(Arc::new(Mutex::new(account)));
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Result<Account> {
        let slot = self.slot(id)?;
        let account = slot.lock().clone();
        Ok(account)
    }

    fn fund(&self, id: &str, amount: Money) -> Result<Account> {
        let amount = check_amount(amount)?;
        let slot = self.slot(id)?;
        let mut account = slot.lock();
        account.credit(amount)?;
        Ok(account.clone())
    }

    fn transfer(&self, from_id: &str, to_id: &str, amount: Money) -> Result<()> {
        let amount = check_amount(amount)?;
        let from_slot = self.slot(from_id)?;
        let to_slot = self.slot(to_id)?;
        if from_id == to_id {
            return Err(LedgerError::SelfTransfer(from_id.to_string()));
        }

        let (mut from, mut to) = if from_id < to_id {
            let from = from_slot.lock();
            let to = to_slot.lock();
            (from, to)
        } else {
            let to = to_slot.lock();
            let from = from_slot.lock();
            (from, to)
        };

        apply_transfer(&mut from, &mut to, amount)
    }

    /// Locks every account in id order before copying, so no transfer can be
    /// observed half-applied. Accounts created mid-call may be left out.
    fn accounts(&self) -> Result<Vec<Account>> {
        let mut slots: Vec<(AccountId, Arc<Mutex<Account>>)> = self
            .accounts
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));

        let guards: Vec<_> = slots.iter().map(|(_, slot)| slot.lock()).collect();
        Ok(guards.iter().map(|account| (**account).clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn money(minor_units: i64) -> Money {
        Money::from_minor_units(minor_units).unwrap()
    }

    fn open(store: &AccountLockStore, id: &str, balance: i64) {
        store
            .create(Account::open(AccountId::new(id).unwrap(), id).unwrap())
            .unwrap();
        if balance > 0 {
            store.fund(id, money(balance)).unwrap();
        }
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let store = AccountLockStore::new();
        open(&store, "alice", 10);

        let again = Account::open(AccountId::new("alice").unwrap(), "other").unwrap();
        assert_eq!(
            store.create(again),
            Err(LedgerError::AccountAlreadyExists("alice".to_string()))
        );
        assert_eq!(store.get("alice").unwrap().balance.minor_units(), 10);
    }

    #[test]
    fn test_transfer_and_not_found() {
        let store = AccountLockStore::new();
        open(&store, "a", 10_000);
        open(&store, "b", 0);

        store.transfer("a", "b", money(5_000)).unwrap();
        assert_eq!(store.get("a").unwrap().balance.minor_units(), 5_000);
        assert_eq!(store.get("b").unwrap().balance.minor_units(), 5_000);

        assert_eq!(store.transfer("a", "zz", money(1)), Err(not_found("zz")));
        assert_eq!(store.get("a").unwrap().balance.minor_units(), 5_000);
    }

    #[test]
    fn test_self_transfer_does_not_deadlock() {
        let store = AccountLockStore::new();
        open(&store, "a", 100);

        assert_eq!(
            store.transfer("a", "a", money(10)),
            Err(LedgerError::SelfTransfer("a".to_string()))
        );
        assert_eq!(store.get("a").unwrap().balance.minor_units(), 100);
    }

    #[test]
    fn test_mirror_transfers_do_not_deadlock() {
        let store = Arc::new(AccountLockStore::new());
        open(&store, "a", 1_000);
        open(&store, "b", 1_000);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let (from, to) = if i % 2 == 0 { ("a", "b") } else { ("b", "a") };
                    for _ in 0..500 {
                        let _ = store.transfer(from, to, money(1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let total: i64 = store
            .accounts()
            .unwrap()
            .iter()
            .map(|a| a.balance.minor_units())
            .sum();
        assert_eq!(total, 2_000);
    }
}
