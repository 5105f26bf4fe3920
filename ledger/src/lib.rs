//! Wallet Ledger
//!
//! In-process account ledger with atomic fund and transfer operations.
//! Balances never go negative, transfers conserve value, and concurrent
//! callers never lose each other's updates.

pub mod account;
pub mod config;
pub mod metrics;
pub mod service;
pub mod store;

pub use account::Account;
pub use config::{LedgerConfig, StoreBackend};
pub use metrics::{LedgerMetrics, MetricsSnapshot};
pub use service::LedgerService;
pub use store::{AccountLockStore, LedgerStore, MemoryStore, UnavailableStore};
