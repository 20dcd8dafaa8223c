//! Test fixtures and server helpers.
//!
//! Provides stores populated with known accounts and a server bound to an
//! OS-assigned port for HTTP tests.

use devreg_core::{Account, AccountStore, Device, MemoryStore};
use devreg_server::{Server, ServerConfig, ServerResult};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Active account id present in [`testing_store`].
pub const ACTIVE_ACCOUNT: &str = "abc";
/// Key of [`ACTIVE_ACCOUNT`].
pub const ACTIVE_KEY: &str = "xyz";
/// Inactive account id present in [`testing_store`].
pub const INACTIVE_ACCOUNT: &str = "go";
/// Key of [`INACTIVE_ACCOUNT`].
pub const INACTIVE_KEY: &str = "095";

/// Returns the development store shared behind an `Arc`.
pub fn testing_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::testing())
}

/// Returns a store with one active account and no devices.
pub fn single_account_store(account_id: &str, key: &str) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_accounts([Account::new(
        account_id, key, true,
    )]))
}

/// Runs a test with a fresh development store.
///
/// # Example
///
/// ```rust,ignore
/// use devreg_testkit::with_testing_store;
///
/// #[test]
/// fn my_test() {
///     with_testing_store(|store| {
///         assert!(store.check_subscription("abc", "xyz").is_ok());
///     });
/// }
/// ```
pub fn with_testing_store<F, R>(f: F) -> R
where
    F: FnOnce(&MemoryStore) -> R,
{
    let store = MemoryStore::testing();
    f(&store)
}

/// Registers `count` devices named `{prefix}-{n}` on one account.
///
/// Returns the number of registrations that succeeded.
pub fn register_devices(
    store: &dyn AccountStore,
    account_id: &str,
    key: &str,
    prefix: &str,
    count: usize,
) -> usize {
    (0..count)
        .filter(|n| {
            let device = Device::new(account_id, format!("{prefix}-{n}"), format!("host-{n}"));
            store.register_device(account_id, key, device).is_ok()
        })
        .count()
}

/// An HTTP server running on a background task.
///
/// The server stops when [`TestServer::shutdown`] is called or when the
/// value is dropped.
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    /// The store behind the server.
    pub store: Arc<MemoryStore>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<ServerResult<()>>>,
}

impl TestServer {
    /// Spawns a server with the default configuration around `store`.
    pub async fn spawn(store: Arc<MemoryStore>) -> Self {
        Self::spawn_with_config(ServerConfig::default(), store).await
    }

    /// Spawns a server with `config` around `store`.
    ///
    /// The bind address in `config` is ignored; the server always listens
    /// on `127.0.0.1` with an OS-assigned port.
    pub async fn spawn_with_config(config: ServerConfig, store: Arc<MemoryStore>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read test listener address");

        let (tx, rx) = oneshot::channel::<()>();
        let server = Server::new(config, Arc::clone(&store) as Arc<dyn AccountStore>);
        let handle = tokio::spawn(server.serve(listener, async {
            let _ = rx.await;
        }));

        Self {
            base_url: format!("http://{addr}"),
            store,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Returns the absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Signals shutdown and waits for the server task to finish.
    pub async fn shutdown(mut self) -> ServerResult<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.expect("Server task panicked"),
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
