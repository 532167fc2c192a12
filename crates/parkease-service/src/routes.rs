//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, branches, dashboard, health, live, loyalty, parking, rates, tariff};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Branch operator (JWT auth)
/// - `POST /v1/branches` - Register own branch profile
/// - `GET /v1/branches/me` - Own branch profile
/// - `GET /v1/dashboard` - Occupancy metrics
/// - `GET /v1/tariff`, `PUT /v1/tariff` - Branch tariff
/// - `POST /v1/parking/entries` - Record vehicle entry
/// - `GET /v1/parking/active` - Vehicles currently parked
/// - `GET /v1/parking/history` - Completed sessions, paginated
/// - `GET /v1/parking/:id/bill` - Billing quote
/// - `POST /v1/parking/:id/pay` - Confirm payment
/// - `GET /v1/parking/live` - WebSocket record events
/// - `GET /v1/loyalty/:plate` - Loyalty balance
/// - `POST /v1/rates/suggest` - AI rate suggestion
///
/// ## Admin (JWT auth with admin capability)
/// - `PUT /v1/loyalty/:plate` - Set loyalty balance
/// - `GET /v1/admin/branches`, `POST /v1/admin/branches` - Branch summaries / create
/// - `GET /v1/admin/branches/:id`, `DELETE /v1/admin/branches/:id` - Branch detail / delete
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Branch profile
        .route("/v1/branches", post(branches::register_branch))
        .route("/v1/branches/me", get(branches::get_branch))
        // Dashboard & tariff
        .route("/v1/dashboard", get(dashboard::get_dashboard))
        .route(
            "/v1/tariff",
            get(tariff::get_tariff).put(tariff::set_tariff),
        )
        // Parking sessions
        .route("/v1/parking/entries", post(parking::record_entry))
        .route("/v1/parking/active", get(parking::list_active))
        .route("/v1/parking/history", get(parking::list_history))
        .route("/v1/parking/live", get(live::live_feed))
        .route("/v1/parking/:id/bill", get(parking::get_bill))
        .route("/v1/parking/:id/pay", post(parking::confirm_payment))
        // Loyalty
        .route(
            "/v1/loyalty/:plate",
            get(loyalty::get_loyalty).put(loyalty::set_loyalty),
        )
        // Rate suggestion
        .route("/v1/rates/suggest", post(rates::suggest_rate))
        // Administration
        .route(
            "/v1/admin/branches",
            get(admin::list_branches).post(admin::create_branch),
        )
        .route(
            "/v1/admin/branches/:id",
            get(admin::get_branch).delete(admin::delete_branch),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
