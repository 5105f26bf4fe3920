//! Ledger configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use wallet_common::{LedgerError, Result};

use crate::store::{AccountLockStore, LedgerStore, MemoryStore, UnavailableStore};

/// Which store implementation backs the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// One lock around the whole account map.
    #[default]
    Memory,
    /// One lock per account, acquired in id order.
    AccountLock,
    /// Always fails. For fault drills.
    Unavailable,
}

impl StoreBackend {
    /// Build a fresh, empty store of this kind.
    pub fn build(&self) -> Arc<dyn LedgerStore> {
        match self {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::AccountLock => Arc::new(AccountLockStore::new()),
            StoreBackend::Unavailable => Arc::new(UnavailableStore::new()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::AccountLock => "account-lock",
            StoreBackend::Unavailable => "unavailable",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "account-lock" | "account_lock" => Ok(StoreBackend::AccountLock),
            "unavailable" => Ok(StoreBackend::Unavailable),
            other => Err(LedgerError::ConfigurationError(format!(
                "unknown store backend '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Store implementation.
    pub store_backend: StoreBackend,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::default(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl LedgerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(backend) = lookup("LEDGER_STORE_BACKEND") {
            config.store_backend = backend.parse()?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level.trim().to_ascii_lowercase();
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.json_logs = format.trim().eq_ignore_ascii_case("json");
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(LedgerError::ConfigurationError(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }
}
