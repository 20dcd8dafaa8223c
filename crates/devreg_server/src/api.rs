//! Request and response bodies.

use devreg_core::{Account, Device};
use serde::{Deserialize, Serialize};

/// Body carried by every account request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequest {
    /// The account key.
    #[serde(default)]
    pub key: String,
}

/// Device fields supplied by a client when registering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRequest {
    /// Device id.
    #[serde(default)]
    pub id: String,
    /// Device hostname.
    #[serde(default)]
    pub hostname: String,
}

/// Body of a device registration request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDeviceRequest {
    /// The account key.
    #[serde(default)]
    pub key: String,
    /// The device to register.
    pub device: DeviceRequest,
}

impl RegisterDeviceRequest {
    /// Builds the stored device record for `account_id`.
    pub fn into_device(self, account_id: &str) -> Device {
        Device::new(account_id, self.device.id, self.device.hostname)
    }
}

/// Public view of an account. The key is never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    /// Account id.
    pub id: String,
    /// Whether the subscription is active.
    pub active: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            active: account.active,
        }
    }
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable message.
    pub error: String,
}
