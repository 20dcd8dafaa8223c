//! Server lifecycle.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{build_router, AppState};
use axum::http::StatusCode;
use axum::Router;
use devreg_core::AccountStore;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The HTTP server.
///
/// Owns the configuration and a handle to the store. The store is passed in
/// explicitly; the server holds no global state.
///
/// # Example
///
/// ```no_run
/// use devreg_core::MemoryStore;
/// use devreg_server::{Server, ServerConfig};
/// use std::sync::Arc;
///
/// # async fn run() -> devreg_server::ServerResult<()> {
/// let server = Server::new(ServerConfig::default(), Arc::new(MemoryStore::testing()));
/// server
///     .run(async {
///         let _ = tokio::signal::ctrl_c().await;
///     })
///     .await
/// # }
/// ```
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Creates a new server around `store`.
    pub fn new(config: ServerConfig, store: Arc<dyn AccountStore>) -> Self {
        Self {
            config,
            state: AppState::new(store),
        }
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router with tracing, timeout, body limit and panic
    /// recovery middleware applied.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
            .layer(CatchPanicLayer::new())
            .layer(RequestBodyLimitLayer::new(self.config.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] if binding or serving fails and
    /// [`ServerError::ShutdownTimeout`] if in-flight requests outlive the
    /// shutdown timeout.
    pub async fn run<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    ///
    /// Once `shutdown` resolves the listener stops accepting connections and
    /// in-flight requests get `shutdown_timeout` to complete.
    ///
    /// # Errors
    ///
    /// See [`Server::run`].
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let shutdown_timeout = self.config.shutdown_timeout;
        let app = self.router();

        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        let signal = async move {
            shutdown.await;
            info!("shutdown requested, draining in-flight requests");
            let _ = draining_tx.send(());
        };

        info!(%addr, "server listening");
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => {
                result?;
                info!("server stopped");
                return Ok(());
            }
            Ok(()) = draining_rx => {}
        }

        match tokio::time::timeout(shutdown_timeout, serve).await {
            Ok(result) => {
                result?;
                info!("server stopped");
                Ok(())
            }
            Err(_) => {
                warn!(
                    ?shutdown_timeout,
                    "in-flight requests did not finish before the shutdown timeout"
                );
                Err(ServerError::ShutdownTimeout(shutdown_timeout))
            }
        }
    }
}
