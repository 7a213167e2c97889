//! Session-backed visitor context.
//!
//! The visitor record is stored as a JSON string in the tower-sessions
//! session, which plays the role of the browser's durable storage slot.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use super::{ContextStore, KeyValueStore, StoreError};
use crate::error::AppError;
use crate::state::AppState;

#[async_trait]
impl KeyValueStore for Session {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Session::get::<String>(self, key)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.insert(key, value)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

/// Context store for the visitor of the current request.
pub type VisitorStore = ContextStore<Session>;

/// Extracts the current visitor's context store.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(store: VisitorStore) -> impl IntoResponse {
///     let context = store.current_context().await;
///     format!("{} from {}", context.key, context.country)
/// }
/// ```
impl FromRequestParts<AppState> for ContextStore<Session> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Session("session layer not installed".to_string()))?;

        Ok(Self::new(session, state.context_events().clone()))
    }
}
