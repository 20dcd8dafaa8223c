//! In-memory account/device store.

use super::backend::AccountStore;
use crate::error::{StoreError, StoreResult};
use crate::model::{Account, Device};
use crate::seed::Seed;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// An account together with the devices indexed under it.
#[derive(Debug, Clone)]
struct AccountRecord {
    account: Account,
    /// Devices keyed by device id.
    devices: HashMap<String, Device>,
}

impl AccountRecord {
    fn new(account: Account) -> Self {
        Self {
            account,
            devices: HashMap::new(),
        }
    }
}

/// A process-local account/device store.
///
/// All state lives behind one mutex. Every operation holds the lock for its
/// whole duration, so validation and mutation in [`AccountStore::register_device`]
/// happen in a single critical section and no update can be lost.
///
/// # Thread Safety
///
/// The store is `Send + Sync` and is meant to be shared behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use devreg_core::{Account, AccountStore, MemoryStore};
///
/// let store = MemoryStore::with_accounts([Account::new("abc", "xyz", true)]);
/// assert!(store.check_subscription("abc", "xyz").is_ok());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<String, AccountRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given accounts and no devices.
    ///
    /// A later account with an id already seen replaces the earlier one.
    /// Use [`MemoryStore::from_seed`] when duplicates must be rejected.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let map = accounts
            .into_iter()
            .map(|account| (account.id.clone(), AccountRecord::new(account)))
            .collect();
        Self {
            accounts: Mutex::new(map),
        }
    }

    /// Creates a store from a provisioning document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSeed`] if the seed fails validation.
    pub fn from_seed(seed: Seed) -> StoreResult<Self> {
        seed.validate()?;

        let mut map = HashMap::with_capacity(seed.accounts.len());
        for entry in seed.accounts {
            let account = Account::new(entry.id, entry.key, entry.active);
            let mut record = AccountRecord::new(account);
            for device in entry.devices {
                let device = Device::new(&record.account.id, device.id, device.hostname);
                record.devices.insert(device.id.clone(), device);
            }
            map.insert(record.account.id.clone(), record);
        }

        Ok(Self {
            accounts: Mutex::new(map),
        })
    }

    /// Creates a store with development data.
    ///
    /// - `abc` / `xyz`, active, devices `device-a` and `device-b`
    /// - `go` / `095`, inactive, no devices
    #[must_use]
    pub fn testing() -> Self {
        let mut abc = AccountRecord::new(Account::new("abc", "xyz", true));
        for device in [
            Device::new("abc", "device-a", "testname"),
            Device::new("abc", "device-b", "testname-b"),
        ] {
            abc.devices.insert(device.id.clone(), device);
        }
        let go = AccountRecord::new(Account::new("go", "095", false));

        let map = [abc, go]
            .into_iter()
            .map(|record| (record.account.id.clone(), record))
            .collect();
        Self {
            accounts: Mutex::new(map),
        }
    }

    /// Returns the number of provisioned accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.lock().len()
    }

    /// Returns the number of devices across all accounts.
    pub fn device_count(&self) -> usize {
        self.accounts
            .lock()
            .values()
            .map(|record| record.devices.len())
            .sum()
    }
}

/// Finds the record for `account_id` if `key` matches.
///
/// Callers must already hold the store lock.
fn validate<'a>(
    accounts: &'a mut HashMap<String, AccountRecord>,
    account_id: &str,
    key: &str,
) -> StoreResult<&'a mut AccountRecord> {
    match accounts.get_mut(account_id) {
        Some(record) if record.account.key_matches(key) => Ok(record),
        _ => Err(StoreError::invalid_credentials(account_id)),
    }
}

impl AccountStore for MemoryStore {
    fn validate_account(&self, account_id: &str, key: &str) -> StoreResult<Account> {
        let mut accounts = self.accounts.lock();
        validate(&mut accounts, account_id, key).map(|record| record.account.clone())
    }

    fn check_subscription(&self, account_id: &str, key: &str) -> StoreResult<()> {
        let mut accounts = self.accounts.lock();
        let record = validate(&mut accounts, account_id, key)?;

        if !record.account.active {
            return Err(StoreError::Inactive {
                account_id: account_id.to_string(),
            });
        }
        Ok(())
    }

    fn register_device(&self, account_id: &str, key: &str, device: Device) -> StoreResult<()> {
        let mut accounts = self.accounts.lock();
        let record = validate(&mut accounts, account_id, key)?;

        let device = Device {
            account_id: record.account.id.clone(),
            ..device
        };
        let replaced = record.devices.insert(device.id.clone(), device).is_some();
        debug!(account_id, replaced, "device stored");
        Ok(())
    }

    fn account(&self, account_id: &str) -> StoreResult<Account> {
        self.accounts
            .lock()
            .get(account_id)
            .map(|record| record.account.clone())
            .ok_or_else(|| StoreError::AccountNotFound {
                account_id: account_id.to_string(),
            })
    }

    fn devices(&self, account_id: &str) -> StoreResult<Vec<Device>> {
        let accounts = self.accounts.lock();
        let record = accounts
            .get(account_id)
            .ok_or_else(|| StoreError::AccountNotFound {
                account_id: account_id.to_string(),
            })?;

        if record.devices.is_empty() {
            return Err(StoreError::NoDevices {
                account_id: account_id.to_string(),
            });
        }

        let mut devices: Vec<Device> = record.devices.values().cloned().collect();
        devices.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(devices)
    }

    fn device(&self, account_id: &str, device_id: &str) -> StoreResult<Device> {
        let accounts = self.accounts.lock();
        let record = accounts
            .get(account_id)
            .ok_or_else(|| StoreError::AccountNotFound {
                account_id: account_id.to_string(),
            })?;

        record
            .devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| StoreError::DeviceNotFound {
                account_id: account_id.to_string(),
                device_id: device_id.to_string(),
            })
    }
}
