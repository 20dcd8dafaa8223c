//! Store capability trait.

use crate::error::StoreResult;
use crate::model::{Account, Device};

/// The operations the HTTP layer needs from an account/device store.
///
/// # Invariants
///
/// - `validate_account` fails with the same error whether the account id is
///   unknown or the key is wrong
/// - `register_device` validates and mutates atomically; a successful
///   registration is visible to every later `devices`/`device` call
/// - A failed `register_device` never changes stored state
/// - `devices` treats an empty device set as not found
/// - Implementations must be `Send + Sync` for use from concurrent handlers
///
/// # Implementors
///
/// - [`super::MemoryStore`] - Process-local, lock-guarded maps
pub trait AccountStore: Send + Sync {
    /// Returns the account when `account_id` exists and `key` matches.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::InvalidCredentials`] if the account does
    /// not exist or the key is wrong.
    fn validate_account(&self, account_id: &str, key: &str) -> StoreResult<Account>;

    /// Checks that the credentials are valid and the subscription is active.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for bad credentials and
    /// [`crate::StoreError::Inactive`] for a lapsed subscription.
    fn check_subscription(&self, account_id: &str, key: &str) -> StoreResult<()>;

    /// Inserts or replaces `device` under the account.
    ///
    /// The device's `account_id` is overwritten with the validated account
    /// id. An existing device with the same id is fully replaced.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if validation fails.
    fn register_device(&self, account_id: &str, key: &str, device: Device) -> StoreResult<()>;

    /// Looks up an account without checking a key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::AccountNotFound`] for an unknown id.
    fn account(&self, account_id: &str) -> StoreResult<Account>;

    /// Returns every device registered under the account, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the account is unknown or has no devices.
    fn devices(&self, account_id: &str) -> StoreResult<Vec<Device>>;

    /// Returns one device.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the account or the device is unknown.
    fn device(&self, account_id: &str, device_id: &str) -> StoreResult<Device>;
}
