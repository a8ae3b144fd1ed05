//! Route table.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router.
///
/// Every registered path carries a method fallback so a wrong method yields
/// `405` with the path echoed back, and the router-level fallback yields
/// `404` for unknown paths.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/messages",
            post(handlers::messages_handler).fallback(handlers::method_not_allowed),
        )
        .route(
            "/v1/messages/count_tokens",
            post(handlers::count_tokens_handler).fallback(handlers::method_not_allowed),
        )
        .route(
            "/health",
            get(handlers::health_handler).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
