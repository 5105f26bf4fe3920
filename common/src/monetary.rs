//! Monetary types for the wallet ledger.
//!
//! Amounts are integer counts of minor currency units (cents), never floats.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, Result};

/// A strictly positive monetary amount in minor units.
///
/// Holding a `Money` is proof that the amount is legal for a fund or transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    /// Create from a count of minor units.
    pub fn from_minor_units(minor_units: i64) -> Result<Self> {
        if minor_units <= 0 {
            return Err(LedgerError::InvalidAmount {
                amount: minor_units,
            });
        }
        Ok(Self(minor_units))
    }

    /// Get the amount in minor units.
    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Add two amounts, producing a new value.
    pub fn checked_add(self, other: Money) -> Result<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(LedgerError::AmountOverflow)
    }
}

impl TryFrom<i64> for Money {
    type Error = LedgerError;

    fn try_from(minor_units: i64) -> Result<Self> {
        Self::from_minor_units(minor_units)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative account balance in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Balance(i64);

impl Balance {
    /// The balance of a freshly opened account.
    pub const ZERO: Balance = Balance(0);

    /// Get the balance in minor units.
    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Check if the balance covers the amount.
    pub fn covers(&self, amount: Money) -> bool {
        self.0 >= amount.0
    }

    /// Balance after crediting `amount`, or `None` on overflow.
    pub fn checked_credit(self, amount: Money) -> Option<Balance> {
        self.0.checked_add(amount.0).map(Balance)
    }

    /// Balance after debiting `amount`, or `None` if it would go negative.
    pub fn checked_debit(self, amount: Money) -> Option<Balance> {
        if !self.covers(amount) {
            return None;
        }
        Some(Balance(self.0 - amount.0))
    }
}

impl TryFrom<i64> for Balance {
    type Error = LedgerError;

    fn try_from(minor_units: i64) -> Result<Self> {
        if minor_units < 0 {
            return Err(LedgerError::InvalidAmount {
                amount: minor_units,
            });
        }
        Ok(Self(minor_units))
    }
}

impl From<Balance> for i64 {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

impl From<Money> for Balance {
    fn from(money: Money) -> Self {
        Self(money.0)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rejects_non_positive() {
        assert_eq!(
            Money::from_minor_units(0),
            Err(LedgerError::InvalidAmount { amount: 0 })
        );
        assert_eq!(
            Money::from_minor_units(-500),
            Err(LedgerError::InvalidAmount { amount: -500 })
        );
        assert_eq!(Money::from_minor_units(1).unwrap().minor_units(), 1);
    }

    #[test]
    fn test_money_addition() {
        let a = Money::from_minor_units(10_000).unwrap();
        let b = Money::from_minor_units(5_000).unwrap();

        assert_eq!(a.checked_add(b).unwrap().minor_units(), 15_000);
        // Operands are untouched.
        assert_eq!(a.minor_units(), 10_000);

        let max = Money::from_minor_units(i64::MAX).unwrap();
        assert_eq!(max.checked_add(b), Err(LedgerError::AmountOverflow));
    }

    #[test]
    fn test_money_ordering() {
        let small = Money::from_minor_units(100).unwrap();
        let large = Money::from_minor_units(200).unwrap();
        assert!(small < large);
        assert_eq!(small, Money::from_minor_units(100).unwrap());
    }

    #[test]
    fn test_balance_debit_never_goes_negative() {
        let balance = Balance::from(Money::from_minor_units(1_000).unwrap());
        let too_much = Money::from_minor_units(5_000).unwrap();
        let exact = Money::from_minor_units(1_000).unwrap();

        assert!(!balance.covers(too_much));
        assert_eq!(balance.checked_debit(too_much), None);
        assert_eq!(balance.checked_debit(exact), Some(Balance::ZERO));
    }

    #[test]
    fn test_balance_credit_overflow() {
        let balance = Balance::from(Money::from_minor_units(i64::MAX).unwrap());
        let one = Money::from_minor_units(1).unwrap();
        assert_eq!(balance.checked_credit(one), None);
        assert_eq!(
            Balance::ZERO.checked_credit(one).map(|b| b.minor_units()),
            Some(1)
        );
    }

    #[test]
    fn test_serde_validates_on_decode() {
        let money: Money = serde_json::from_str("2500").unwrap();
        assert_eq!(money.minor_units(), 2500);
        assert_eq!(serde_json::to_string(&money).unwrap(), "2500");

        assert!(serde_json::from_str::<Money>("0").is_err());
        assert!(serde_json::from_str::<Money>("-1").is_err());
        assert!(serde_json::from_str::<Balance>("-1").is_err());
        assert_eq!(serde_json::from_str::<Balance>("0").unwrap(), Balance::ZERO);
    }
}
