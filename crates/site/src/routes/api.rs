//! JSON API route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use omni_core::{GameFlags, VisitorContext};

use crate::context::session::VisitorStore;
use crate::flags::resolve_flags;
use crate::state::AppState;

/// Current visitor context. Creates the default record if none exists.
#[instrument(skip(store))]
pub async fn context(store: VisitorStore) -> Json<VisitorContext> {
    Json(store.current_context().await)
}

/// Flags evaluated for the current visitor, keyed by catalog key.
#[instrument(skip(state, store))]
pub async fn flags(State(state): State<AppState>, store: VisitorStore) -> Json<GameFlags> {
    let context = store.current_context().await;
    Json(resolve_flags(state.flags(), &context).await)
}
