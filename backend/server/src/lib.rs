//! Documentation of a completion tracker for an interactive game map.
//!
//! Players browse a custom map, filter markers by category and mark locations as found.
//! This crate is the HTTP side: read-only catalog endpoints plus per-user completion state.
//!
//!
//!
//! # General Infrastructure
//! - User goes through an authenticating reverse proxy
//! - The proxy forwards the verified identity in `x-user-id` (configurable)
//! - Optionally the proxy also sends a shared secret so the identity header cannot be forged from outside
//! - Catalog (groups, categories, locations) is a protobuf snapshot loaded once at startup
//! - Completions live in Redis
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Caller | |
//! |---|---|---|---|
//! | GET | `/groups` | - | groups by id |
//! | GET | `/categories` | - | categories by id |
//! | GET | `/locations` | - | locations by id |
//! | GET | `/marker-types` | - | category display info |
//! | GET | `/completions` | yes | completed location ids |
//! | GET | `/markers` | yes | locations with completed flags |
//! | POST | `/users` | yes | register the caller |
//! | POST | `/complete` | yes | toggle `{"locationId": n}` |
//!
//!
//!
//! # Toggle
//! - 401 without a caller identity
//! - 404 when the caller never registered
//! - 400 when `locationId` is missing or not an integer
//! - 404 for unknown locations unless `VALIDATE_LOCATIONS=false`
//! - 201 on the first toggle (`completed: true`), 200 afterwards (flipped)
//!
//! Nothing is written to the store before all of the above pass.
//!
//!
//!
//! # Setup
//!
//! Seed the catalog, then run the server.
//! ```sh
//! cargo run -p process -- --data-dir data --output catalog.bin
//! CATALOG_PATH=catalog.bin STORE=memory RUST_LOG=info cargo run -p tracker
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use routes::{
    categories_handler, complete_handler, completions_handler, groups_handler, locations_handler,
    marker_types_handler, markers_handler, register_handler,
};
use state::State;

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/groups", get(groups_handler))
        .route("/categories", get(categories_handler))
        .route("/locations", get(locations_handler))
        .route("/marker-types", get(marker_types_handler))
        .route("/completions", get(completions_handler))
        .route("/markers", get(markers_handler))
        .route("/users", post(register_handler))
        .route("/complete", post(complete_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
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
}
