//! # folio-api
//!
//! Public HTTP API for the portfolio site: read-only projects, experience,
//! and profile, plus the contact form. Admin operations go through the CLI.

pub mod middleware;
pub mod routes;

use axum::Router;
use folio_store::Contexts;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub contexts: Contexts,
    /// Body size cap for incoming requests, in bytes
    pub max_body_bytes: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(contexts: Contexts, max_body_bytes: usize) -> Self {
        Self { contexts, max_body_bytes, started_at: Instant::now() }
    }
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    let api_routes = Router::new()
        .merge(routes::health::router())
        .merge(routes::projects::router())
        .merge(routes::experience::router())
        .merge(routes::profile::router())
        .merge(routes::contact::router());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(body_limit))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}
