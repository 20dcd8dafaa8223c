//! # devreg Core
//!
//! Account and device store for the devreg subscription service.
//!
//! This crate provides:
//! - The [`Account`] and [`Device`] entity model
//! - The [`AccountStore`] capability trait consumed by the HTTP layer
//! - [`MemoryStore`], a lock-guarded in-memory implementation
//! - [`Seed`] provisioning documents for populating a store at startup
//!
//! ## Validation
//!
//! Every operation that takes an account key runs the same validation step:
//! the account must exist and the supplied key must match. Both failures
//! produce the same error so a caller holding a wrong key cannot learn
//! whether the account id exists.
//!
//! ## Example
//!
//! ```rust
//! use devreg_core::{AccountStore, Device, MemoryStore};
//!
//! let store = MemoryStore::testing();
//! store
//!     .register_device("abc", "xyz", Device::new("abc", "laptop", "h1"))
//!     .unwrap();
//!
//! let device = store.device("abc", "laptop").unwrap();
//! assert_eq!(device.hostname, "h1");
//! assert!(store.check_subscription("abc", "wrong").unwrap_err().is_not_found());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod error;
mod model;
mod seed;
mod store;

pub use error::{StoreError, StoreResult};
pub use model::{Account, Device};
pub use seed::{Seed, SeedAccount, SeedDevice};
pub use store::{AccountStore, MemoryStore};
