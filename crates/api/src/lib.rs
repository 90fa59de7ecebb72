//! # clinicbook API
//!
//! Web server for the clinic appointment booking service. Patients browse a
//! rolling window of half-hour slots and claim one; admins list every booking.
//!
//! ## Architecture
//!
//! - **Routes**: endpoint and URL structure
//! - **Handlers**: request processing against the storage contract
//! - **Middleware**: session authentication and error mapping
//! - **Config**: environment-driven settings
//!
//! The API uses Axum as the web framework; all persistence goes through the
//! `Storage` trait so handlers never talk to a database driver directly.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for session authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use clinicbook_db::Storage;
use eyre::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state, cloned into every request handler.
pub struct ApiState {
    /// Entity store; `PgStorage` in production, `MemStorage` in tests.
    pub storage: Arc<dyn Storage>,
}

/// Assembles the application router. Factored out of `start_server` so tests
/// can mount the exact production route table against their own storage.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Login, logout, current user
        .merge(routes::auth::routes())
        // Slot availability
        .merge(routes::slots::routes())
        // Booking endpoints
        .merge(routes::bookings::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server: initializes logging, builds the router, applies
/// CORS/timeout layers, and serves until shutdown.
pub async fn start_server(config: config::ApiConfig, storage: Arc<dyn Storage>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState { storage });
    let app = app(state);

    // Apply CORS configuration if origins are specified. Credentials must be
    // allowed: the session rides in a cookie.
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .filter_map(|origin| origin.parse::<axum::http::HeaderValue>().ok())
            .collect::<Vec<_>>();
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request logging and timeout middleware
    let app = app
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(
            tower::ServiceBuilder::new()
                .layer(axum::error_handling::HandleErrorLayer::new(
                    |_: tower::BoxError| async { axum::http::StatusCode::REQUEST_TIMEOUT },
                ))
                .timeout(std::time::Duration::from_secs(config.request_timeout)),
        );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
