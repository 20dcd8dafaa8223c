//! # devreg Server
//!
//! HTTP API for the devreg subscription and device registration service.
//!
//! This crate provides:
//! - HTTP endpoints (health, validate, account, devices, device, register)
//! - Request authorization against an [`devreg_core::AccountStore`]
//! - Mapping of store outcomes to HTTP status codes
//! - Server lifecycle with graceful shutdown
//!
//! # Routes
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | GET  | `/health` | 200 |
//! | POST | `/v1/accounts/{account}/validate` | 200 |
//! | GET  | `/v1/accounts/{account}` | 200 + account summary |
//! | GET  | `/v1/accounts/{account}/devices` | 200 + device list |
//! | GET  | `/v1/accounts/{account}/devices/{device}` | 200 + device |
//! | PUT  | `/v1/accounts/{account}/device` | 200 |
//!
//! Every account route expects a JSON body carrying the account key:
//! `{"key": "..."}`. Missing or malformed input is rejected with 400, bad
//! credentials with 401 and a lapsed subscription with 402.
//!
//! # Example
//!
//! ```rust,ignore
//! use devreg_core::MemoryStore;
//! use devreg_server::{Server, ServerConfig};
//! use std::sync::Arc;
//!
//! let server = Server::new(ServerConfig::default(), Arc::new(MemoryStore::testing()));
//! server.run(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod api;
mod config;
mod error;
mod handler;
mod server;

pub use api::{AccountRequest, AccountResponse, DeviceRequest, ErrorBody, RegisterDeviceRequest};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{build_router, AppState};
pub use server::Server;
