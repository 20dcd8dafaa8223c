//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// The first four variants are all of the "not found" kind (see
/// [`StoreError::is_not_found`]). Callers that authenticate clients must treat
/// them identically.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The account does not exist or the supplied key does not match.
    #[error("account does not exist or account key is invalid: {account_id}")]
    InvalidCredentials {
        /// The account id supplied by the caller.
        account_id: String,
    },

    /// No account with this id.
    #[error("account with id {account_id} does not exist")]
    AccountNotFound {
        /// The account id that was looked up.
        account_id: String,
    },

    /// The account exists but has no registered devices.
    #[error("account with id {account_id} does not have any devices")]
    NoDevices {
        /// The account id that was looked up.
        account_id: String,
    },

    /// The account has no device with this id.
    #[error("account with id {account_id} does not have device with id {device_id}")]
    DeviceNotFound {
        /// The account id that was looked up.
        account_id: String,
        /// The device id that was not found.
        device_id: String,
    },

    /// Credentials are valid but the subscription has lapsed.
    #[error("subscription is not active for account {account_id}")]
    Inactive {
        /// The inactive account.
        account_id: String,
    },

    /// Provisioning data is inconsistent.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// Provisioning data is not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Provisioning data could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Returns true for every error of the "not found" kind: unknown
    /// account, wrong key, unknown device or an empty device set.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidCredentials { .. }
                | StoreError::AccountNotFound { .. }
                | StoreError::NoDevices { .. }
                | StoreError::DeviceNotFound { .. }
        )
    }

    /// Returns true when the account is valid but not entitled.
    pub fn is_inactive(&self) -> bool {
        matches!(self, StoreError::Inactive { .. })
    }

    pub(crate) fn invalid_credentials(account_id: &str) -> Self {
        StoreError::InvalidCredentials {
            account_id: account_id.to_string(),
        }
    }
}
