//! Omni gaming marketing site library.
//!
//! This crate provides the site as a library so the router can be driven
//! from integration tests.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - Visitor context persisted in the tower-sessions session
//! - Feature flags from a relay, or offline defaults when none is configured
//! - Hero carousels mounted per page with server-side auto-advance over SSE

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod flags;
pub mod hero;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tracking;

use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Directory served under `/static`, relative to the workspace root.
const STATIC_DIR: &str = "crates/site/static";

/// Build the site router with sessions installed.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
