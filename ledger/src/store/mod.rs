//! Account storage backends.
//!
//! Every store owns its accounts outright. Reads hand back copies and writes
//! take accounts by value, so nothing outside a store can alias its state.

mod account_lock;
mod memory;
mod unavailable;

pub use account_lock::AccountLockStore;
pub use memory::MemoryStore;
pub use unavailable::UnavailableStore;

use wallet_common::{LedgerError, Money, Result};

use crate::account::Account;

/// Storage capability consumed by the ledger service.
///
/// Each operation is atomic with respect to every other operation on the
/// same accounts: its effects are either fully visible or not at all.
pub trait LedgerStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Insert a new account. Fails if the id is already taken.
    fn create(&self, account: Account) -> Result<()>;

    /// Get a copy of an account.
    fn get(&self, id: &str) -> Result<Account>;

    /// Credit an account and return its state right after the credit.
    fn fund(&self, id: &str, amount: Money) -> Result<Account>;

    /// Move `amount` from one account to another.
    fn transfer(&self, from_id: &str, to_id: &str, amount: Money) -> Result<()>;

    /// Copies of every account, taken under one consistent view.
    fn accounts(&self) -> Result<Vec<Account>>;
}

// `Money` cannot hold a non-positive value today; stores still refuse one
// should that type ever loosen.
fn check_amount(amount: Money) -> Result<Money> {
    if amount.minor_units() <= 0 {
        return Err(LedgerError::InvalidAmount {
            amount: amount.minor_units(),
        });
    }
    Ok(amount)
}

fn not_found(id: &str) -> LedgerError {
    LedgerError::AccountNotFound(id.to_string())
}
