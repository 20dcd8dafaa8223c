//! # devreg Testkit
//!
//! Test utilities for devreg.
//!
//! This crate provides:
//! - Store fixtures and a throwaway HTTP server
//! - Property-based test generators using proptest
//! - Stress testing utilities for concurrent registration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use devreg_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_server() {
//!     let server = TestServer::spawn(testing_store()).await;
//!     let url = server.url("/health");
//!     // ... issue requests
//!     server.shutdown().await.unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
