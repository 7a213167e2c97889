//! Analytics event tracking.
//!
//! Tracking is fire-and-forget: [`EventSink::track`] is synchronous and
//! infallible, so a render never waits on, or fails because of, the
//! analytics collector.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use omni_core::UiVariant;

use crate::config::{TrackingConfig, bearer};

/// Emitted when a hero mount first sees, or changes, its A/B variant.
pub const HERO_EXPOSURE: &str = "hero_exposure";

/// Emitted when the hero call-to-action is activated.
pub const HERO_CTA_CLICK: &str = "hero_cta_click";

/// A single analytics event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
    pub name: String,
    pub properties: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl TrackedEvent {
    #[must_use]
    pub fn new(name: &str, properties: Map<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            properties,
            timestamp: Utc::now(),
        }
    }
}

/// Destination for analytics events.
pub trait EventSink: Send + Sync {
    /// Hand off an event. Must not block or panic.
    fn track(&self, event: TrackedEvent);
}

/// Writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn track(&self, event: TrackedEvent) {
        let properties = Value::Object(event.properties);
        tracing::info!(
            event = %event.name,
            %properties,
            timestamp = %event.timestamp,
            "tracked event"
        );
    }
}

/// Posts events to an HTTP collector in the background.
#[derive(Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    url: Url,
}

impl HttpSink {
    /// Create a collector client.
    ///
    /// # Errors
    ///
    /// Returns error if the write key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(url: Url, config: &TrackingConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.write_key {
            match HeaderValue::from_str(&bearer(key)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => tracing::warn!(error = %e, "ignoring invalid tracking write key"),
            }
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, url })
    }
}

impl EventSink for HttpSink {
    fn track(&self, event: TrackedEvent) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(event = %event.name, "no runtime, dropping tracked event");
            return;
        };

        let request = self.client.post(self.url.clone()).json(&event);
        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(
                        event = %event.name,
                        status = response.status().as_u16(),
                        "collector rejected event"
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(event = %event.name, error = %e, "failed to send event"),
            }
        });
    }
}

/// Hero tracking facade over the configured sink.
#[derive(Clone)]
pub struct Tracker {
    sink: Arc<dyn EventSink>,
}

impl Tracker {
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Build the sink described by configuration.
    ///
    /// Falls back to [`LogSink`] if the collector client cannot be built.
    #[must_use]
    pub fn from_config(config: &TrackingConfig) -> Self {
        let Some(url) = config.url.clone() else {
            return Self::new(Arc::new(LogSink));
        };

        match HttpSink::new(url, config) {
            Ok(sink) => Self::new(Arc::new(sink)),
            Err(e) => {
                tracing::error!(error = %e, "failed to build tracking client, logging events");
                Self::new(Arc::new(LogSink))
            }
        }
    }

    pub fn hero_exposure(&self, variant: UiVariant, vip: bool) {
        self.sink
            .track(TrackedEvent::new(HERO_EXPOSURE, hero_properties(variant, vip)));
    }

    pub fn hero_cta_click(&self, variant: UiVariant, vip: bool) {
        self.sink
            .track(TrackedEvent::new(HERO_CTA_CLICK, hero_properties(variant, vip)));
    }
}

fn hero_properties(variant: UiVariant, vip: bool) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("variant".to_string(), variant.as_str().into());
    properties.insert("vip".to_string(), vip.into());
    properties
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use axum::Json;
    use axum::extract::State;
    use axum::routing::post;
    use tokio::sync::mpsc;

    use super::*;

    #[derive(Default)]
    struct Recorded(Mutex<Vec<TrackedEvent>>);

    impl EventSink for Recorded {
        fn track(&self, event: TrackedEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_hero_events() {
        let sink = Arc::new(Recorded::default());
        let tracker = Tracker::new(sink.clone());

        tracker.hero_exposure(UiVariant::Bold, true);
        tracker.hero_cta_click(UiVariant::Control, false);

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, HERO_EXPOSURE);
        assert_eq!(
            Value::Object(events[0].properties.clone()),
            serde_json::json!({ "variant": "bold", "vip": true })
        );
        assert_eq!(events[1].name, HERO_CTA_CLICK);
        assert_eq!(
            Value::Object(events[1].properties.clone()),
            serde_json::json!({ "variant": "control", "vip": false })
        );
    }

    #[test]
    fn test_http_sink_without_runtime_drops_event() {
        let url = Url::parse("http://127.0.0.1:9/collect").unwrap();
        let sink = HttpSink::new(url, &TrackingConfig::default()).unwrap();
        sink.track(TrackedEvent::new(HERO_EXPOSURE, Map::new()));
    }

    #[tokio::test]
    async fn test_http_sink_posts_event() {
        let (sender, mut received) = mpsc::unbounded_channel::<Value>();
        let app = axum::Router::new()
            .route(
                "/collect",
                post(
                    |State(sender): State<mpsc::UnboundedSender<Value>>,
                     Json(body): Json<Value>| async move {
                        let _ = sender.send(body);
                    },
                ),
            )
            .with_state(sender);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let url = Url::parse(&format!("http://{addr}/collect")).unwrap();
        let tracker = Tracker::new(Arc::new(
            HttpSink::new(url, &TrackingConfig::default()).unwrap(),
        ));
        tracker.hero_cta_click(UiVariant::Bold, false);

        let body = tokio::time::timeout(Duration::from_secs(5), received.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(body["name"], HERO_CTA_CLICK);
        assert_eq!(body["properties"]["variant"], "bold");
    }

    #[test]
    fn test_from_config_without_url_uses_log_sink() {
        let tracker = Tracker::from_config(&TrackingConfig::default());
        tracker.hero_exposure(UiVariant::Control, false);
    }
}
