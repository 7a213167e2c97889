//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::context::ContextEvents;
use crate::flags::{FlagError, FlagEvaluator, OfflineFlags, RemoteFlags};
use crate::hero::HeroMounts;
use crate::tracking::{EventSink, Tracker};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("flag evaluator: {0}")]
    Flags(#[from] FlagError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// flag evaluator, the context change hub and live hero mounts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    flags: Arc<dyn FlagEvaluator>,
    context_events: ContextEvents,
    hero_mounts: HeroMounts,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Uses the flag relay when one is configured, otherwise offline flags
    /// with the optional overrides file.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay client cannot be built or the overrides
    /// file cannot be loaded.
    pub fn new(config: SiteConfig) -> Result<Self, StateError> {
        let flags: Arc<dyn FlagEvaluator> = match (&config.flags.relay, &config.flags.overrides_file) {
            (Some(relay), _) => {
                tracing::info!(url = %relay.url, "using flag relay");
                Arc::new(RemoteFlags::new(relay, config.flags.cache_ttl)?)
            }
            (None, Some(path)) => {
                tracing::info!(path = %path.display(), "using offline flags with overrides");
                Arc::new(OfflineFlags::from_file(path)?)
            }
            (None, None) => {
                tracing::info!("using offline flags");
                Arc::new(OfflineFlags::new())
            }
        };
        let tracker = Tracker::from_config(&config.tracking);

        Ok(Self::from_parts(config, flags, tracker))
    }

    /// Create application state around explicit services.
    #[must_use]
    pub fn with_services(
        config: SiteConfig,
        flags: Arc<dyn FlagEvaluator>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self::from_parts(config, flags, Tracker::new(sink))
    }

    fn from_parts(config: SiteConfig, flags: Arc<dyn FlagEvaluator>, tracker: Tracker) -> Self {
        let hero_mounts = HeroMounts::new(&config.hero, tracker);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                flags,
                context_events: ContextEvents::new(),
                hero_mounts,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get the flag evaluator.
    #[must_use]
    pub fn flags(&self) -> &dyn FlagEvaluator {
        self.inner.flags.as_ref()
    }

    /// Get a shared handle to the flag evaluator, for background tasks.
    #[must_use]
    pub fn flags_handle(&self) -> Arc<dyn FlagEvaluator> {
        Arc::clone(&self.inner.flags)
    }

    /// Get the visitor context change hub.
    #[must_use]
    pub fn context_events(&self) -> &ContextEvents {
        &self.inner.context_events
    }

    #[must_use]
    pub fn hero_mounts(&self) -> &HeroMounts {
        &self.inner.hero_mounts
    }
}
