//! Operation counters for ledger monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

use wallet_common::LedgerError;

/// Ledger service metrics.
#[derive(Debug, Default)]
pub struct LedgerMetrics {
    /// Accounts successfully created.
    pub accounts_created: AtomicU64,
    /// Fund operations applied.
    pub funds_applied: AtomicU64,
    /// Transfers attempted.
    pub transfers_total: AtomicU64,
    /// Transfers applied.
    pub transfers_success: AtomicU64,
    /// Transfers refused for a business reason.
    pub transfers_rejected: AtomicU64,
    /// Calls that failed because the store was unavailable.
    pub store_failures: AtomicU64,
    /// Minor units moved by successful transfers.
    pub volume_transferred: AtomicU64,
}

impl LedgerMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an account creation.
    pub fn account_created(&self) {
        self.accounts_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fund.
    pub fn fund_applied(&self) {
        self.funds_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful transfer.
    pub fn transfer_success(&self, minor_units: i64) {
        self.transfers_total.fetch_add(1, Ordering::Relaxed);
        self.transfers_success.fetch_add(1, Ordering::Relaxed);
        self.volume_transferred
            .fetch_add(minor_units.unsigned_abs(), Ordering::Relaxed);
    }

    /// Record a failed transfer.
    pub fn transfer_failed(&self, error: &LedgerError) {
        self.transfers_total.fetch_add(1, Ordering::Relaxed);
        if matches!(error, LedgerError::StoreUnavailable(_)) {
            self.store_failure();
        } else {
            self.transfers_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a store fault.
    pub fn store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accounts_created: self.accounts_created.load(Ordering::Relaxed),
            funds_applied: self.funds_applied.load(Ordering::Relaxed),
            transfers_total: self.transfers_total.load(Ordering::Relaxed),
            transfers_success: self.transfers_success.load(Ordering::Relaxed),
            transfers_rejected: self.transfers_rejected.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            volume_transferred: self.volume_transferred.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus text format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP ledger_accounts_created Total accounts created
# TYPE ledger_accounts_created counter
ledger_accounts_created {}

# HELP ledger_funds_applied Total fund operations applied
# TYPE ledger_funds_applied counter
ledger_funds_applied {}

# HELP ledger_transfers_total Total transfers attempted
# TYPE ledger_transfers_total counter
ledger_transfers_total {}

# HELP ledger_transfers_success Total transfers applied
# TYPE ledger_transfers_success counter
ledger_transfers_success {}

# HELP ledger_transfers_rejected Total transfers rejected
# TYPE ledger_transfers_rejected counter
ledger_transfers_rejected {}

# HELP ledger_store_failures Total store failures
# TYPE ledger_store_failures counter
ledger_store_failures {}

# HELP ledger_volume_transferred Minor units moved by transfers
# TYPE ledger_volume_transferred counter
ledger_volume_transferred {}
"#,
            snapshot.accounts_created,
            snapshot.funds_applied,
            snapshot.transfers_total,
            snapshot.transfers_success,
            snapshot.transfers_rejected,
            snapshot.store_failures,
            snapshot.volume_transferred,
        )
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub accounts_created: u64,
    pub funds_applied: u64,
    pub transfers_total: u64,
    pub transfers_success: u64,
    pub transfers_rejected: u64,
    pub store_failures: u64,
    pub volume_transferred: u64,
}
