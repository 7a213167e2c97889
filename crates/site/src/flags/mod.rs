//! Flag evaluation.
//!
//! The flag service is an external black box: given the visitor context it
//! returns a value per catalog key. The site only ever calls
//! [`resolve_flags`], which turns any failure into the catalog defaults so
//! every page can be rendered without the service.
//!
//! # Evaluators
//!
//! - [`OfflineFlags`] - defaults plus fixed overrides, no network
//! - [`RemoteFlags`] - relay client with a per-context evaluation cache

pub mod offline;
pub mod remote;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use omni_core::{FlagKey, GameFlags, VisitorContext};

use crate::context::ContextChanged;

pub use offline::OfflineFlags;
pub use remote::RemoteFlags;

/// Errors that can occur when evaluating flags.
#[derive(Debug, Error)]
pub enum FlagError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Relay returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// An override file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse a response or override file.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Evaluator could not be built from configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Values returned by one evaluation, keyed by flag key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagSet {
    values: Map<String, Value>,
}

impl FlagSet {
    #[must_use]
    pub const fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Value of `key`, or `default` when missing or of the wrong type.
    #[must_use]
    pub fn evaluate<T: DeserializeOwned>(&self, key: FlagKey, default: T) -> T {
        key.read(&self.values, default)
    }

    /// Typed view of every catalog key.
    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        GameFlags::from_values(&self.values)
    }

    pub fn set(&mut self, key: FlagKey, value: impl Into<Value>) {
        self.values.insert(key.as_str().to_string(), value.into());
    }
}

/// A flag service the site can evaluate against.
#[async_trait]
pub trait FlagEvaluator: Send + Sync {
    /// Evaluate every flag for the given visitor.
    async fn evaluate_all(&self, context: &VisitorContext) -> Result<FlagSet, FlagError>;

    /// Called after the visitor's record changed, so cached evaluations can
    /// be refreshed.
    async fn identify(&self, _context: &VisitorContext) {}
}

/// Evaluate flags for a visitor, falling back to catalog defaults.
pub async fn resolve_flags(evaluator: &dyn FlagEvaluator, context: &VisitorContext) -> GameFlags {
    match evaluator.evaluate_all(context).await {
        Ok(flags) => flags.game_flags(),
        Err(e) => {
            tracing::warn!(error = %e, "flag evaluation failed, serving defaults");
            GameFlags::default()
        }
    }
}

/// Re-identify the visitor with the flag service on every context change.
///
/// Runs until the change channel closes.
pub fn spawn_context_listener(
    mut changes: broadcast::Receiver<ContextChanged>,
    evaluator: Arc<dyn FlagEvaluator>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => evaluator.identify(&change.context).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "context listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("context listener stopped");
    })
}
