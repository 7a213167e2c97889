//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                           - Home page (mounts a hero)
//! GET    /partials/banner            - Responsible-gaming banner (fragment)
//!
//! # Visitor context (HTMX fragments, trigger userContextChanged)
//! POST   /context/vip                - Switch to the VIP segment
//! POST   /context/regular            - Switch to the regular segment
//! POST   /context/country            - Set country (form: country=GB|BE)
//!
//! # Hero (HTMX fragments)
//! GET    /hero/{mount}               - Re-render with fresh flags
//! POST   /hero/{mount}/next          - Next slide
//! POST   /hero/{mount}/previous      - Previous slide
//! POST   /hero/{mount}/slide/{index} - Jump to slide
//! POST   /hero/{mount}/cta           - CTA click (204)
//! GET    /hero/{mount}/events        - Auto-advance ticks (SSE)
//! DELETE /hero/{mount}               - Unmount
//!
//! # JSON API
//! GET    /api/context                - Current visitor context
//! GET    /api/flags                  - Evaluated flags for the visitor
//! ```

pub mod api;
pub mod context;
pub mod hero;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the visitor context routes router.
pub fn context_routes() -> Router<AppState> {
    Router::new()
        .route("/vip", post(context::become_vip))
        .route("/regular", post(context::become_regular))
        .route("/country", post(context::set_country))
}

/// Create the hero routes router.
pub fn hero_routes() -> Router<AppState> {
    Router::new()
        .route("/{mount}", get(hero::show).delete(hero::unmount))
        .route("/{mount}/next", post(hero::next))
        .route("/{mount}/previous", post(hero::previous))
        .route("/{mount}/slide/{index}", post(hero::jump_to))
        .route("/{mount}/cta", post(hero::cta))
        .route("/{mount}/events", get(hero::events))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/context", get(api::context))
        .route("/flags", get(api::flags))
}

/// Create all site routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/partials/banner", get(home::banner))
        .nest("/context", context_routes())
        .nest("/hero", hero_routes())
        .nest("/api", api_routes())
}
