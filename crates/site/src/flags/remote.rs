//! Flag relay client.
//!
//! Posts the visitor context to the relay and caches the returned values per
//! context for a short TTL.
//!
//! ```text
//! POST {FLAGS_URL}/v1/evaluate
//! Authorization: <sdk key>
//! { "context": { "key": "...", "kind": "user", "country": "GB", "custom": { ... } } }
//!
//! 200 { "flags": { "ui.variant": "bold", ... } }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use omni_core::VisitorContext;

use super::{FlagError, FlagEvaluator, FlagSet};
use crate::config::FlagRelayConfig;

/// Evaluation endpoint, relative to the relay base URL.
const EVALUATE_PATH: &str = "v1/evaluate";

/// Distinct visitor contexts kept in the cache.
const CACHE_CAPACITY: u64 = 10_000;

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    context: &'a VisitorContext,
}

#[derive(Deserialize)]
struct EvaluateResponse {
    #[serde(default)]
    flags: Map<String, Value>,
}

/// Flag evaluator backed by a remote relay.
#[derive(Clone)]
pub struct RemoteFlags {
    client: reqwest::Client,
    endpoint: Url,
    cache: Cache<VisitorContext, FlagSet>,
}

impl RemoteFlags {
    /// Create a relay client.
    ///
    /// # Errors
    ///
    /// Returns error if the SDK key is not a valid header value, the
    /// endpoint URL cannot be built, or the HTTP client fails to build.
    pub fn new(relay: &FlagRelayConfig, cache_ttl: Duration) -> Result<Self, FlagError> {
        let mut auth = HeaderValue::from_str(relay.sdk_key.expose_secret())
            .map_err(|e| FlagError::Config(format!("Invalid SDK key format: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(relay.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: evaluate_endpoint(&relay.url)?,
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(cache_ttl)
                .build(),
        })
    }

    async fn fetch(&self, context: &VisitorContext) -> Result<FlagSet, FlagError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&EvaluateRequest { context })
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FlagError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EvaluateResponse = response
            .json()
            .await
            .map_err(|e| FlagError::Parse(e.to_string()))?;

        tracing::debug!(flags = body.flags.len(), "fetched flag evaluation");
        Ok(FlagSet::new(body.flags))
    }
}

#[async_trait]
impl FlagEvaluator for RemoteFlags {
    async fn evaluate_all(&self, context: &VisitorContext) -> Result<FlagSet, FlagError> {
        if let Some(flags) = self.cache.get(context).await {
            return Ok(flags);
        }

        let flags = self.fetch(context).await?;
        self.cache.insert(context.clone(), flags.clone()).await;
        Ok(flags)
    }

    async fn identify(&self, context: &VisitorContext) {
        self.cache.invalidate(context).await;
        match self.fetch(context).await {
            Ok(flags) => self.cache.insert(context.clone(), flags).await,
            Err(e) => tracing::warn!(error = %e, "failed to refresh flags after context change"),
        }
    }
}

/// Resolve the evaluation endpoint, treating the base URL as a directory.
fn evaluate_endpoint(base: &Url) -> Result<Url, FlagError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(EVALUATE_PATH)
        .map_err(|e| FlagError::Config(format!("Invalid relay URL: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::{HeaderMap as RequestHeaders, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use secrecy::SecretString;

    use omni_core::{Country, UiVariant};

    use super::*;

    #[derive(Clone, Default)]
    struct Relay {
        calls: Arc<AtomicUsize>,
    }

    /// Serves `bold` to BE visitors and `control` to everyone else.
    async fn evaluate(
        State(relay): State<Relay>,
        headers: RequestHeaders,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("sdk-test-5d1e") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        relay.calls.fetch_add(1, Ordering::SeqCst);
        let variant = if body["context"]["country"] == "BE" {
            "bold"
        } else {
            "control"
        };
        Ok(Json(serde_json::json!({ "flags": { "ui.variant": variant } })))
    }

    async fn start_relay(relay: Relay) -> Url {
        let app = Router::new()
            .route("/relay/v1/evaluate", post(evaluate))
            .with_state(relay);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Url::parse(&format!("http://{addr}/relay")).unwrap()
    }

    fn relay_config(url: Url, key: &str) -> FlagRelayConfig {
        FlagRelayConfig {
            url,
            sdk_key: SecretString::from(key.to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_evaluate_endpoint() {
        let with_path = Url::parse("https://flags.internal/relay").unwrap();
        assert_eq!(
            evaluate_endpoint(&with_path).unwrap().as_str(),
            "https://flags.internal/relay/v1/evaluate"
        );

        let root = Url::parse("https://flags.internal").unwrap();
        assert_eq!(
            evaluate_endpoint(&root).unwrap().as_str(),
            "https://flags.internal/v1/evaluate"
        );
    }

    #[tokio::test]
    async fn test_evaluates_per_context_and_caches() {
        let relay = Relay::default();
        let url = start_relay(relay.clone()).await;
        let flags =
            RemoteFlags::new(&relay_config(url, "sdk-test-5d1e"), Duration::from_secs(60)).unwrap();

        let be = VisitorContext::regular(Country::Be);
        let first = flags.evaluate_all(&be).await.unwrap();
        let again = flags.evaluate_all(&be).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(
            first.evaluate(omni_core::FlagKey::UiVariant, UiVariant::Control),
            UiVariant::Bold
        );
        assert_eq!(relay.calls.load(Ordering::SeqCst), 1);

        let gb = flags
            .evaluate_all(&VisitorContext::regular(Country::Gb))
            .await
            .unwrap();
        assert_eq!(gb.game_flags().ui_variant, UiVariant::Control);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_identify_refetches() {
        let relay = Relay::default();
        let url = start_relay(relay.clone()).await;
        let flags =
            RemoteFlags::new(&relay_config(url, "sdk-test-5d1e"), Duration::from_secs(60)).unwrap();

        let context = VisitorContext::vip(Country::Gb);
        flags.evaluate_all(&context).await.unwrap();
        flags.identify(&context).await;
        flags.evaluate_all(&context).await.unwrap();

        assert_eq!(relay.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let relay = Relay::default();
        let url = start_relay(relay.clone()).await;
        let flags =
            RemoteFlags::new(&relay_config(url, "sdk-wrong-key"), Duration::from_secs(60)).unwrap();

        let result = flags.evaluate_all(&VisitorContext::default()).await;
        assert!(matches!(result, Err(FlagError::Api { status: 401, .. })));
    }
}
