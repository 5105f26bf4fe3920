//! Concurrent access tests
//!
//! These tests race many callers against the same accounts and check that
//! no update is lost and no balance is ever driven below zero.
//!
//! Run with: cargo test -p wallet-ledger --test concurrency_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use wallet_common::LedgerError;
use wallet_ledger::{LedgerService, StoreBackend};

/// Number of concurrent transfers in the contention scenario.
const TRANSFER_COUNT: usize = 200;

const BACKENDS: [StoreBackend; 2] = [StoreBackend::Memory, StoreBackend::AccountLock];

fn seeded(backend: StoreBackend, balances: &[(&str, i64)]) -> LedgerService {
    let service = LedgerService::new(backend.build());
    for (id, balance) in balances {
        service.create_account(id, id).unwrap();
        if *balance > 0 {
            service.fund_account(id, *balance).unwrap();
        }
    }
    service
}

fn balance(service: &LedgerService, id: &str) -> i64 {
    service.get_account(id).unwrap().balance.minor_units()
}

#[test]
fn test_concurrent_transfers_lose_no_updates() {
    for backend in BACKENDS {
        let service = seeded(backend, &[("A", 100_000), ("B", 0)]);
        let barrier = Arc::new(Barrier::new(TRANSFER_COUNT));

        let handles: Vec<_> = (0..TRANSFER_COUNT)
            .map(|_| {
                let service = service.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    service.transfer("A", "B", 100)
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(balance(&service, "B"), 20_000, "backend {}", backend);
        assert_eq!(balance(&service, "A"), 80_000, "backend {}", backend);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_transfers_from_async_tasks() {
    for backend in BACKENDS {
        let service = seeded(backend, &[("A", 100_000), ("B", 0)]);

        let tasks: Vec<_> = (0..TRANSFER_COUNT)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.transfer("A", "B", 100) })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(balance(&service, "B"), 20_000);
        assert_eq!(balance(&service, "A"), 80_000);
    }
}

#[test]
fn test_racing_overdraft_succeeds_exactly_as_often_as_funds_allow() {
    for backend in BACKENDS {
        let service = seeded(backend, &[("A", 1_000), ("B", 0)]);
        let barrier = Arc::new(Barrier::new(50));
        let succeeded = Arc::new(AtomicUsize::new(0));
        let insufficient = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let service = service.clone();
                let barrier = Arc::clone(&barrier);
                let succeeded = Arc::clone(&succeeded);
                let insufficient = Arc::clone(&insufficient);
                thread::spawn(move || {
                    barrier.wait();
                    match service.transfer("A", "B", 100) {
                        Ok(()) => succeeded.fetch_add(1, Ordering::SeqCst),
                        Err(LedgerError::InsufficientFunds { .. }) => {
                            insufficient.fetch_add(1, Ordering::SeqCst)
                        }
                        Err(e) => panic!("unexpected error: {e}"),
                    };
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(succeeded.load(Ordering::SeqCst), 10);
        assert_eq!(insufficient.load(Ordering::SeqCst), 40);
        assert_eq!(balance(&service, "A"), 0);
        assert_eq!(balance(&service, "B"), 1_000);
    }
}

#[test]
fn test_concurrent_funds_return_distinct_snapshots() {
    for backend in BACKENDS {
        let service = seeded(backend, &[("A", 0)]);
        let barrier = Arc::new(Barrier::new(100));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let service = service.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    service.fund_account("A", 10).unwrap().balance.minor_units()
                })
            })
            .collect();

        let mut seen: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        seen.sort_unstable();

        // Each caller observes its own credit and nothing later.
        let expected: Vec<i64> = (1..=100).map(|i| i * 10).collect();
        assert_eq!(seen, expected);
        assert_eq!(balance(&service, "A"), 1_000);
    }
}

#[test]
fn test_mirror_and_ring_transfers_conserve_supply() {
    let ids = ["w", "x", "y", "z"];
    for backend in BACKENDS {
        let balances: Vec<_> = ids.iter().map(|id| (*id, 5_000)).collect();
        let service = seeded(backend, &balances);
        let barrier = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|t| {
                let service = service.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..250 {
                        let from = ids[(t + i) % ids.len()];
                        let to = if t % 2 == 0 {
                            ids[(t + i + 1) % ids.len()]
                        } else {
                            ids[(t + i + ids.len() - 1) % ids.len()]
                        };
                        match service.transfer(from, to, 7) {
                            Ok(()) | Err(LedgerError::InsufficientFunds { .. }) => {}
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                })
            })
            .collect();

        // Audit while transfers are in flight: totals must hold at every view.
        for _ in 0..20 {
            assert_eq!(service.total_supply().unwrap(), 20_000);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.total_supply().unwrap(), 20_000);
        for account in service.accounts().unwrap() {
            assert!(account.balance.minor_units() >= 0);
        }
    }
}
