//! Visitor context store.
//!
//! Owns the single persisted [`VisitorContext`] record of a visitor and the
//! change notifications for it. The record lives under [`STORAGE_KEY`] in a
//! [`KeyValueStore`]; in production that is the visitor's session (see
//! [`session`]).
//!
//! Storage problems never reach callers. A read that fails or returns
//! unparsable JSON counts as "no record"; a write that fails is logged and
//! the operation still returns the record it meant to persist, so persisted
//! and returned state can diverge until the next successful write.

pub mod session;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use omni_core::{Country, VipStatus, VisitorContext};

/// Storage key of the visitor record.
pub const STORAGE_KEY: &str = "omni-user-context";

/// Buffered change notifications per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Minimal string key-value storage the context store persists into.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Broadcast after every successful write of the visitor record.
#[derive(Debug, Clone)]
pub struct ContextChanged {
    pub context: VisitorContext,
}

/// In-process change notification hub.
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct ContextEvents {
    sender: broadcast::Sender<ContextChanged>,
}

impl ContextEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Receive every change published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ContextChanged> {
        self.sender.subscribe()
    }

    fn publish(&self, context: VisitorContext) {
        // No subscribers is not an error.
        let _ = self.sender.send(ContextChanged { context });
    }
}

impl Default for ContextEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Read and update operations on the visitor record.
pub struct ContextStore<S> {
    storage: S,
    events: ContextEvents,
}

impl<S: KeyValueStore> ContextStore<S> {
    pub const fn new(storage: S, events: ContextEvents) -> Self {
        Self { storage, events }
    }

    /// Receive change notifications for all visitor records.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ContextChanged> {
        self.events.subscribe()
    }

    /// Replace the record with a VIP one, keeping the current country.
    pub async fn become_vip(&self) -> VisitorContext {
        let context = VisitorContext::vip(self.stored_country().await);
        self.persist(&context).await;
        tracing::info!(country = %context.country, "visitor switched to VIP");
        context
    }

    /// Replace the record with a regular one, keeping the current country.
    pub async fn become_regular(&self) -> VisitorContext {
        let context = VisitorContext::regular(self.stored_country().await);
        self.persist(&context).await;
        tracing::info!(country = %context.country, "visitor switched to regular");
        context
    }

    /// Update only the country of the record, creating a default one first
    /// if none exists.
    pub async fn set_country(&self, country: Country) -> VisitorContext {
        let mut context = self.load().await.unwrap_or_default();
        context.country = country;
        self.persist(&context).await;
        tracing::info!(%country, "visitor country updated");
        context
    }

    /// Current country. Never writes.
    pub async fn country(&self) -> Country {
        self.stored_country().await
    }

    /// Current record, creating and persisting a regular GB record if there
    /// is none.
    pub async fn current_context(&self) -> VisitorContext {
        if let Some(context) = self.load().await {
            return context;
        }
        let context = VisitorContext::default();
        self.persist(&context).await;
        tracing::debug!("created default visitor context");
        context
    }

    pub async fn vip_status(&self) -> VipStatus {
        self.current_context().await.vip_status()
    }

    async fn stored_country(&self) -> Country {
        self.load()
            .await
            .map_or_else(Country::default, |context| context.country)
    }

    /// Read the stored record. Unreadable storage counts as no record.
    async fn load(&self) -> Option<VisitorContext> {
        let raw = match self.storage.get(STORAGE_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read visitor context");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(context) => Some(context),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparsable visitor context");
                None
            }
        }
    }

    /// Write the record and notify subscribers. Failures are logged only.
    async fn persist(&self, context: &VisitorContext) {
        let raw = match serde_json::to_string(context) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize visitor context");
                return;
            }
        };

        match self.storage.set(STORAGE_KEY, raw).await {
            Ok(()) => self.events.publish(context.clone()),
            Err(e) => tracing::warn!(error = %e, "failed to persist visitor context"),
        }
    }
}
