//! Sandbox server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::store::SandboxStore;

/// HTTP server exposing the backend endpoints over a [`SandboxStore`].
pub struct SandboxServer {
    store: Arc<SandboxStore>,
}

impl SandboxServer {
    pub fn new(store: SandboxStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Shared handle to the store, for inspection in tests.
    pub fn store(&self) -> Arc<SandboxStore> {
        self.store.clone()
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/confirm_transaction", post(handlers::confirm_transaction))
            .route("/check_payment_status", post(handlers::check_payment_status))
            .route("/sandbox/settle", post(handlers::settle))
            .layer(TraceLayer::new_for_http())
            .with_state(self.store.clone())
    }

    /// Runs the server on the given address until Ctrl+C or SIGTERM.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Sandbox listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }

    /// Serves on an already bound listener until the task is dropped.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping sandbox...");
}
