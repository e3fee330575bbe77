use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use taskboard_common::Board;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use super::api::{self, AppState};
use super::ws;
use crate::errors::ServerError;

/// Configuration for the board server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub dev_mode: bool,
    pub broadcast_capacity: usize,
    /// Start from the example board rather than an empty one
    pub seed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            cors_origin: "http://localhost:3000".to_string(),
            dev_mode: false,
            broadcast_capacity: 64,
            seed: true,
        }
    }
}

impl ServerConfig {
    pub fn initial_board(&self) -> Board {
        if self.seed { Board::seeded() } else { Board::empty() }
    }
}

/// Build the full application router with the REST API and the `/ws` channel.
pub fn build_router(state: Arc<AppState>) -> Router {
    api::api_router()
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}

/// CORS policy: anything goes in dev mode, otherwise only the configured
/// front-end origin.
pub fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, ServerError> {
    if config.dev_mode {
        return Ok(CorsLayer::permissive());
    }
    let origin =
        HeaderValue::from_str(&config.cors_origin).map_err(|_| ServerError::InvalidOrigin {
            origin: config.cors_origin.clone(),
        })?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Start the board server and run until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(
        config.initial_board(),
        config.broadcast_capacity,
    ));
    let app = build_router(state).layer(cors_layer(&config)?);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let local_addr = listener.local_addr().map_err(ServerError::Serve)?;
    info!(
        addr = %local_addr,
        dev_mode = config.dev_mode,
        seeded = config.seed,
        "taskboard server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            // Without a signal handler the server runs until killed.
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
