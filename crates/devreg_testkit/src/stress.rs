//! Stress tests for the account store.
//!
//! These helpers drive concurrent registrations and lookups against any
//! [`AccountStore`] and report throughput.

use devreg_core::{AccountStore, Device};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a stress run against one account.
#[derive(Debug, Clone)]
pub struct StressReport {
    /// Operations the store accepted.
    pub accepted: usize,
    /// Operations the store rejected.
    pub rejected: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// Devices stored on the account once every thread finished.
    pub devices_after: usize,
}

impl StressReport {
    /// Total operations attempted.
    pub fn total(&self) -> usize {
        self.accepted + self.rejected
    }

    /// Attempted operations per second, or zero for an instantaneous run.
    pub fn ops_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total() as f64 / secs
        } else {
            0.0
        }
    }

    /// Prints the report.
    pub fn print_summary(&self, name: &str) {
        println!(
            "{name}: {}/{} accepted, {} devices stored, {:.0} ops/sec over {:?}",
            self.accepted,
            self.total(),
            self.devices_after,
            self.ops_per_second(),
            self.elapsed
        );
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent threads.
    pub threads: usize,
    /// Operations performed by each thread.
    pub ops_per_thread: usize,
}

impl StressConfig {
    /// Total number of operations across all threads.
    pub fn total_ops(&self) -> usize {
        self.threads * self.ops_per_thread
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            ops_per_thread: 250,
        }
    }
}

/// Registers distinct devices from many threads on one account.
///
/// Thread `t` registers `t-0 .. t-{ops_per_thread}`, so every registration
/// targets a different device id.
pub fn stress_concurrent_registrations(
    store: Arc<dyn AccountStore>,
    account_id: &str,
    key: &str,
    config: &StressConfig,
) -> StressReport {
    run_threads(store.as_ref(), account_id, config, |t, i| {
        let device = Device::new(account_id, format!("{t}-{i}"), format!("host-{t}-{i}"));
        store.register_device(account_id, key, device).is_ok()
    })
}

/// Registers the same device id from many threads on one account.
///
/// Exactly one device must remain afterwards, holding one of the written
/// hostnames.
pub fn stress_contended_overwrites(
    store: Arc<dyn AccountStore>,
    account_id: &str,
    key: &str,
    device_id: &str,
    config: &StressConfig,
) -> StressReport {
    run_threads(store.as_ref(), account_id, config, |t, i| {
        let device = Device::new(account_id, device_id, format!("host-{t}-{i}"));
        store.register_device(account_id, key, device).is_ok()
    })
}

/// Interleaves registrations, subscription checks and lookups.
///
/// A third of the operations use a wrong key and are expected to fail.
pub fn stress_mixed_operations(
    store: Arc<dyn AccountStore>,
    account_id: &str,
    key: &str,
    config: &StressConfig,
) -> StressReport {
    run_threads(store.as_ref(), account_id, config, |t, i| match i % 3 {
        0 => {
            let device = Device::new(account_id, format!("{t}-{i}"), "mixed");
            store.register_device(account_id, key, device).is_ok()
        }
        1 => store.check_subscription(account_id, key).is_ok() && store.devices(account_id).is_ok(),
        _ => store.validate_account(account_id, "wrong-key").is_ok(),
    })
}

fn run_threads<F>(
    store: &dyn AccountStore,
    account_id: &str,
    config: &StressConfig,
    op: F,
) -> StressReport
where
    F: Fn(usize, usize) -> bool + Sync,
{
    let accepted = AtomicUsize::new(0);
    let rejected = AtomicUsize::new(0);
    let start = Instant::now();

    thread::scope(|scope| {
        for t in 0..config.threads {
            let op = &op;
            let accepted = &accepted;
            let rejected = &rejected;
            scope.spawn(move || {
                for i in 0..config.ops_per_thread {
                    let counter = if op(t, i) { accepted } else { rejected };
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });
    let elapsed = start.elapsed();

    StressReport {
        accepted: accepted.into_inner(),
        rejected: rejected.into_inner(),
        elapsed,
        devices_after: store.devices(account_id).map_or(0, |devices| devices.len()),
    }
}
