use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes — require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Portfolio
        .route("/api/portfolio", post(handlers::portfolio::snapshot))
        // Whales
        .route(
            "/api/whales/:chain/:address/portfolio",
            get(handlers::whales::portfolio),
        )
        // Segments
        .route("/api/segments/portfolio", post(handlers::segments::portfolio))
        // Alerts
        .route("/api/alerts/significant", post(handlers::alerts::significant))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // CORS: dashboard origins are proxied same-origin; direct access needs token
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
