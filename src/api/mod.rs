//! HTTP surface for the dashboard.
//!
//! Every range endpoint regenerates its transactions from the query
//! parameters, so handlers share nothing but read-only configuration.

pub mod error;
pub mod query;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            start_time: Instant::now(),
        }
    }
}

/// Build the application router.
pub fn build_router(config: Arc<Config>) -> Router {
    routes::routes().with_state(AppState::new(config))
}

/// Server instance that can be started
pub struct Server {
    config: Arc<Config>,
    router: Router,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let router = build_router(config.clone());
        Self { config, router }
    }

    /// Bind to the configured host/port and serve until the process exits.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener =
            TcpListener::bind((self.config.server.host.as_str(), self.config.server.port)).await?;
        self.run_with_listener(listener).await
    }

    /// Serve on an already bound listener (port 0 in tests).
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!("Dashboard API listening on http://{addr}");
        axum::serve(listener, self.router).await
    }

    /// Start a server on a random local port in a background task.
    #[cfg(test)]
    pub async fn spawn_test_server(config: Config) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Self::new(config);
        let handle = tokio::spawn(async move {
            server.run_with_listener(listener).await.ok();
        });
        (addr, handle)
    }
}
