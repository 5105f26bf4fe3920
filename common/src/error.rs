//! Error types for ledger operations.

use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is not strictly positive.
    #[error("Invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: i64 },

    /// Adding two amounts overflowed.
    #[error("Amount overflow")]
    AmountOverflow,

    /// Referenced account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Source balance is below the requested amount.
    #[error("Insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: String,
        required: i64,
        available: i64,
    },

    /// An account with this id is already provisioned.
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    /// Source and destination are the same account.
    #[error("Cannot transfer from account {0} to itself")]
    SelfTransfer(String),

    /// Account fields failed validation.
    #[error("Invalid account {field}: {reason}")]
    InvalidAccount {
        field: &'static str,
        reason: String,
    },

    /// Crediting would exceed the representable balance.
    #[error("Balance overflow on account {0}")]
    BalanceOverflow(String),

    /// The backing store cannot complete the operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LedgerError {
    /// Check if this error is retryable by the caller.
    ///
    /// Business rejections are final; only a store fault may clear up on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::StoreUnavailable(_))
    }

    /// Get a stable error code for transport mapping.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount { .. } => "INVALID_AMOUNT",
            LedgerError::AmountOverflow => "AMOUNT_OVERFLOW",
            LedgerError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            LedgerError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            LedgerError::AccountAlreadyExists(_) => "ACCOUNT_ALREADY_EXISTS",
            LedgerError::SelfTransfer(_) => "SELF_TRANSFER",
            LedgerError::InvalidAccount { .. } => "INVALID_ACCOUNT",
            LedgerError::BalanceOverflow(_) => "BALANCE_OVERFLOW",
            LedgerError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            LedgerError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
