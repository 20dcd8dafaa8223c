//! Property-based test generators using proptest.
//!
//! Provides strategies for generating accounts, devices and provisioning
//! documents that satisfy the store's invariants.

use devreg_core::{Device, Seed, SeedAccount, SeedDevice};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Strategy for generating non-empty account ids.
pub fn account_id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

/// Strategy for generating non-empty account keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,32}"
}

/// Strategy for generating non-empty device ids.
pub fn device_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9._-]{0,23}"
}

/// Strategy for generating hostnames, including the empty hostname.
pub fn hostname_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        4 => "[a-z][a-z0-9-]{0,30}(\\.[a-z]{2,6})?",
    ]
}

/// Strategy for generating devices owned by `account_id`.
pub fn device_strategy(account_id: String) -> impl Strategy<Value = Device> {
    (device_id_strategy(), hostname_strategy())
        .prop_map(move |(id, hostname)| Device::new(account_id.clone(), id, hostname))
}

/// Strategy for generating a batch of devices for one account.
///
/// Device ids may repeat, which exercises overwrite semantics.
pub fn device_batch_strategy(
    account_id: String,
    max: usize,
) -> impl Strategy<Value = Vec<Device>> {
    prop::collection::vec(device_strategy(account_id), 0..=max)
}

/// Strategy for generating valid provisioning documents.
///
/// Account ids are unique and device ids are unique within each account.
pub fn seed_strategy(max_accounts: usize, max_devices: usize) -> impl Strategy<Value = Seed> {
    let device_map = prop::collection::btree_map(
        device_id_strategy(),
        hostname_strategy(),
        0..=max_devices,
    );
    let account = (key_strategy(), any::<bool>(), device_map);

    prop::collection::btree_map(account_id_strategy(), account, 0..=max_accounts).prop_map(
        |accounts: BTreeMap<String, (String, bool, BTreeMap<String, String>)>| Seed {
            accounts: accounts
                .into_iter()
                .map(|(id, (key, active, devices))| SeedAccount {
                    id,
                    key,
                    active,
                    devices: devices
                        .into_iter()
                        .map(|(id, hostname)| SeedDevice { id, hostname })
                        .collect(),
                })
                .collect(),
        },
    )
}
