//! Session middleware configuration.
//!
//! Sessions live in a bounded moka cache. Each record expires at its own
//! expiry date, and the least recently used sessions are evicted once the
//! cache is full. The session only holds the visitor context record, so
//! losing it just resets that visitor to the default context.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "omni_session";

/// Session expiry time in seconds (30 days).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Upper bound on sessions held in memory.
const MAX_SESSIONS: u64 = 100_000;

/// Create the bounded in-memory session store.
#[must_use]
pub fn create_session_store() -> MokaStore {
    MokaStore::new(Some(MAX_SESSIONS))
}

/// Create the session layer.
#[must_use]
pub fn create_session_layer(config: &SiteConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(create_session_store())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::SessionStore;
    use tower_sessions::cookie::time::{Duration, OffsetDateTime};
    use tower_sessions::session::{Id, Record};

    use super::*;

    fn record() -> Record {
        let mut data = HashMap::new();
        data.insert(
            "omni-user-context".to_string(),
            serde_json::Value::String("{}".to_string()),
        );
        Record {
            id: Id::default(),
            data,
            expiry_date: OffsetDateTime::now_utc() + Duration::days(1),
        }
    }

    #[tokio::test]
    async fn test_store_round_trip_and_delete() {
        let store = create_session_store();
        let mut record = record();

        store.create(&mut record).await.unwrap();
        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.data, record.data);

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_session_is_absent() {
        let store = create_session_store();
        assert!(store.load(&Id::default()).await.unwrap().is_none());
    }

    #[test]
    fn test_cookie_is_secure_only_over_https() {
        let config = SiteConfig {
            base_url: "https://demo1.example".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.is_secure());
        assert!(!SiteConfig::default().is_secure());
        let _layer = create_session_layer(&config);
    }
}
