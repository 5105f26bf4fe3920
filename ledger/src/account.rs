//! Account definitions for ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wallet_common::{AccountId, Balance, LedgerError, Money, Result};

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Owner label.
    pub owner: String,
    /// Current balance in minor units.
    pub balance: Balance,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the balance last changed.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Open a new account with a zero balance.
    pub fn open(id: AccountId, owner: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        if owner.trim().is_empty() {
            return Err(LedgerError::InvalidAccount {
                field: "owner",
                reason: "must not be empty".to_string(),
            });
        }

        let now = Utc::now();
        Ok(Self {
            id,
            owner,
            balance: Balance::ZERO,
            created_at: now,
            updated_at: now,
        })
    }

    /// Increase the balance.
    pub fn credit(&mut self, amount: Money) -> Result<()> {
        let balance = self
            .balance
            .checked_credit(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(self.id.to_string()))?;
        self.set_balance(balance);
        Ok(())
    }

    /// Decrease the balance. Fails without touching it if funds are short.
    pub fn debit(&mut self, amount: Money) -> Result<()> {
        let balance = self.balance.checked_debit(amount).ok_or_else(|| {
            LedgerError::InsufficientFunds {
                account: self.id.to_string(),
                required: amount.minor_units(),
                available: self.balance.minor_units(),
            }
        })?;
        self.set_balance(balance);
        Ok(())
    }

    fn set_balance(&mut self, balance: Balance) {
        self.balance = balance;
        self.updated_at = Utc::now();
    }
}

/// Move `amount` between two accounts, all or nothing.
///
/// Both legs are validated before either account is written.
pub(crate) fn apply_transfer(from: &mut Account, to: &mut Account, amount: Money) -> Result<()> {
    if !from.balance.covers(amount) {
        return Err(LedgerError::InsufficientFunds {
            account: from.id.to_string(),
            required: amount.minor_units(),
            available: from.balance.minor_units(),
        });
    }
    if to.balance.checked_credit(amount).is_none() {
        return Err(LedgerError::BalanceOverflow(to.id.to_string()));
    }

    from.debit(amount)?;
    to.credit(amount)
}
