use crate::{
    config::StreamConfig,
    error::{Result, SkelcastError, StreamError},
    registry::ConnectionRegistry,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::info;

use super::handlers::{bad_request_handler, version_handler, ws_handler};

/// Shared state for the Axum server
#[derive(Clone)]
pub struct ServerState {
    pub(crate) registry: Arc<ConnectionRegistry>,
}

/// WebSocket fan-out server for tracked-skeleton events.
///
/// Serves `GET /version`, upgrades WebSocket requests on `/` into
/// registered connections, and answers everything else with a 400.
pub struct StreamServer {
    pub(crate) config: StreamConfig,
    pub(crate) registry: Arc<ConnectionRegistry>,
}

impl StreamServer {
    /// Create a new streaming server
    pub fn new(config: StreamConfig, registry: Arc<ConnectionRegistry>) -> Self {
        Self { config, registry }
    }

    /// Build the request router. Split out so tests can drive it without
    /// binding a socket.
    pub(crate) fn router(state: ServerState) -> Router {
        Router::new()
            .route("/version", get(version_handler).fallback(bad_request_handler))
            .route("/", get(ws_handler).fallback(bad_request_handler))
            .fallback(bad_request_handler)
            .with_state(state)
    }

    /// Start the HTTP server and begin accepting WebSocket clients
    pub async fn start(&self) -> Result<()> {
        let state = ServerState {
            registry: Arc::clone(&self.registry),
        };

        let app = Self::router(state);

        let addr = format!("{}:{}", self.config.ip, self.config.port);

        info!("Starting WebSocket broadcast server on {}", addr);

        let listener =
            tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| StreamError::BindFailed {
                    address: addr.clone(),
                    source: e,
                })?;

        info!("Broadcast server listening on {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| StreamError::StartupFailed {
                details: format!("Server error: {}", e),
            })?;

        Ok(())
    }
}

/// Stream server builder for configuration
pub struct StreamServerBuilder {
    config: Option<StreamConfig>,
    registry: Option<Arc<ConnectionRegistry>>,
}

impl StreamServerBuilder {
    /// Create a new stream server builder
    pub fn new() -> Self {
        Self {
            config: None,
            registry: None,
        }
    }

    /// Set the stream configuration
    pub fn config(mut self, config: StreamConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the connection registry
    pub fn registry(mut self, registry: Arc<ConnectionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the stream server
    pub fn build(self) -> Result<StreamServer> {
        let config = self.config.ok_or_else(|| {
            SkelcastError::Stream(StreamError::StartupFailed {
                details: "Stream configuration is required".to_string(),
            })
        })?;

        let registry = self.registry.ok_or_else(|| {
            SkelcastError::Stream(StreamError::StartupFailed {
                details: "Connection registry is required".to_string(),
            })
        })?;

        Ok(StreamServer::new(config, registry))
    }
}

impl Default for StreamServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
