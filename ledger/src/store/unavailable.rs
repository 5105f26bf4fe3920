//! Store double that fails every operation.

use wallet_common::{LedgerError, Money, Result};

use super::LedgerStore;
use crate::account::Account;

/// A store whose backend is permanently down.
///
/// Used for fault injection: everything built on top of it must surface an
/// error for every call.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    /// Create a failing store with a default reason.
    pub fn new() -> Self {
        Self::with_reason("backend offline")
    }

    /// Create a failing store that reports `reason`.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(LedgerError::StoreUnavailable(self.reason.clone()))
    }
}

impl Default for UnavailableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for UnavailableStore {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn create(&self, _account: Account) -> Result<()> {
        self.fail()
    }

    fn get(&self, _id: &str) -> Result<Account> {
        self.fail()
    }

    fn fund(&self, _id: &str, _amount: Money) -> Result<Account> {
        self.fail()
    }

    fn transfer(&self, _from_id: &str, _to_id: &str, _amount: Money) -> Result<()> {
        self.fail()
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_common::AccountId;

    #[test]
    fn test_every_operation_fails() {
        let store = UnavailableStore::with_reason("disk on fire");
        let expected = LedgerError::StoreUnavailable("disk on fire".to_string());
        let amount = Money::from_minor_units(1).unwrap();
        let account = Account::open(AccountId::new("a").unwrap(), "A").unwrap();

        assert_eq!(store.create(account), Err(expected.clone()));
        assert_eq!(store.get("a"), Err(expected.clone()));
        assert_eq!(store.fund("a", amount), Err(expected.clone()));
        assert_eq!(store.transfer("a", "b", amount), Err(expected.clone()));
        assert_eq!(store.accounts(), Err(expected));
    }
}
