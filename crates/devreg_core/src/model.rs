//! Entity model: accounts and the devices registered under them.

use serde::{Deserialize, Serialize};

/// A billing principal.
///
/// Accounts are provisioned when a store is constructed and are read-only
/// afterwards. The `key` is a shared secret compared against the key a
/// client presents with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: String,
    /// Shared secret used to authenticate requests for this account.
    pub key: String,
    /// Whether the account has an active subscription.
    pub active: bool,
}

impl Account {
    /// Creates a new account.
    pub fn new(id: impl Into<String>, key: impl Into<String>, active: bool) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            active,
        }
    }

    /// Compares `candidate` against the account key.
    ///
    /// The comparison visits every byte of the longer input so that its
    /// running time does not depend on the length of the matching prefix.
    #[must_use]
    pub fn key_matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.key.as_bytes(), candidate.as_bytes())
    }
}

/// An end-user device registered under exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    /// The owning account. Always equal to the account the device is
    /// indexed under.
    pub account_id: String,
    /// Device identifier, unique within the owning account.
    pub id: String,
    /// Display hostname reported by the device.
    pub hostname: String,
}

impl Device {
    /// Creates a new device record.
    pub fn new(
        account_id: impl Into<String>,
        id: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            id: id.into(),
            hostname: hostname.into(),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = a.len() ^ b.len();
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}
