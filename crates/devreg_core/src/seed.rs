//! Provisioning documents.
//!
//! Accounts cannot be created through the store interface. They are loaded
//! once at startup from a JSON document of the form:
//!
//! ```json
//! {
//!   "accounts": [
//!     { "id": "abc", "key": "xyz", "active": true,
//!       "devices": [ { "id": "device-a", "hostname": "testname" } ] }
//!   ]
//! }
//! ```

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A provisioning document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    /// Accounts to provision.
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
}

/// One provisioned account and its initial devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAccount {
    /// Account id.
    pub id: String,
    /// Account key.
    pub key: String,
    /// Whether the subscription is active.
    #[serde(default)]
    pub active: bool,
    /// Devices registered at startup.
    #[serde(default)]
    pub devices: Vec<SeedDevice>,
}

/// A device registered at startup. The owning account is implied by nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedDevice {
    /// Device id.
    pub id: String,
    /// Device hostname.
    #[serde(default)]
    pub hostname: String,
}

impl Seed {
    /// Parses a seed from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] for malformed JSON.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a seed file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Serialization`] if it is not a valid seed.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Returns the total number of devices in the seed.
    pub fn device_count(&self) -> usize {
        self.accounts.iter().map(|a| a.devices.len()).sum()
    }

    /// Checks the seed for consistency.
    ///
    /// Account ids must be unique and non-empty, keys must be non-empty, and
    /// device ids must be unique and non-empty within their account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSeed`] describing the first problem found.
    pub fn validate(&self) -> StoreResult<()> {
        let mut seen = HashSet::with_capacity(self.accounts.len());

        for account in &self.accounts {
            if account.id.is_empty() {
                return Err(StoreError::InvalidSeed("account with empty id".into()));
            }
            if account.key.is_empty() {
                return Err(StoreError::InvalidSeed(format!(
                    "account {} has an empty key",
                    account.id
                )));
            }
            if !seen.insert(account.id.as_str()) {
                return Err(StoreError::InvalidSeed(format!(
                    "duplicate account id {}",
                    account.id
                )));
            }

            let mut devices = HashSet::with_capacity(account.devices.len());
            for device in &account.devices {
                if device.id.is_empty() {
                    return Err(StoreError::InvalidSeed(format!(
                        "account {} has a device with an empty id",
                        account.id
                    )));
                }
                if !devices.insert(device.id.as_str()) {
                    return Err(StoreError::InvalidSeed(format!(
                        "account {} has duplicate device id {}",
                        account.id, device.id
                    )));
                }
            }
        }

        Ok(())
    }
}
