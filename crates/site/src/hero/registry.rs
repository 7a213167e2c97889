//! Live hero mounts.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use super::mount::HeroMount;
use crate::config::HeroConfig;
use crate::tracking::Tracker;

/// Upper bound on concurrently mounted heroes.
const MAX_MOUNTS: u64 = 50_000;

/// Registry of mounted heroes, keyed by mount id.
///
/// A mount no request has touched for the configured idle time is evicted,
/// as is one removed with [`HeroMounts::unmount`]. Nothing else ends a
/// mount, so a page whose event stream drops and reconnects keeps its hero.
/// Eviction drops the registry's handle, which stops the mount's timer once
/// no in-flight request holds it.
#[derive(Clone)]
pub struct HeroMounts {
    mounts: Cache<Uuid, Arc<HeroMount>>,
    autoplay: Duration,
    tracker: Tracker,
}

impl HeroMounts {
    #[must_use]
    pub fn new(config: &HeroConfig, tracker: Tracker) -> Self {
        Self {
            mounts: Cache::builder()
                .max_capacity(MAX_MOUNTS)
                .time_to_idle(config.mount_idle)
                .build(),
            autoplay: config.autoplay,
            tracker,
        }
    }

    /// Create and register a new mount.
    pub async fn mount(&self) -> Arc<HeroMount> {
        let mount = HeroMount::new(Uuid::new_v4(), self.autoplay, self.tracker.clone());
        self.mounts.insert(mount.id(), Arc::clone(&mount)).await;
        tracing::debug!(mount = %mount.id(), "hero mounted");
        mount
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<HeroMount>> {
        self.mounts.get(&id).await
    }

    /// Remove a mount. Returns `false` if it was not registered.
    pub async fn unmount(&self, id: Uuid) -> bool {
        self.mounts.remove(&id).await.is_some()
    }

    /// Mark mount `id` as used. Returns `false` once it is gone.
    pub async fn touch(&self, id: Uuid) -> bool {
        self.mounts.get(&id).await.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::tracking::LogSink;

    use super::*;

    fn registry(mount_idle: Duration) -> HeroMounts {
        let config = HeroConfig {
            mount_idle,
            ..HeroConfig::default()
        };
        HeroMounts::new(&config, Tracker::new(Arc::new(LogSink)))
    }

    #[tokio::test]
    async fn test_mount_and_unmount() {
        let mounts = registry(Duration::from_secs(60));
        let mount = mounts.mount().await;

        let found = mounts.get(mount.id()).await.unwrap();
        assert!(Arc::ptr_eq(&found, &mount));

        assert!(mounts.unmount(mount.id()).await);
        assert!(mounts.get(mount.id()).await.is_none());
        assert!(!mounts.unmount(mount.id()).await);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let mounts = registry(Duration::from_secs(60));
        assert!(mounts.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_idle_mount_expires() {
        let mounts = registry(Duration::from_millis(50));
        let id = mounts.mount().await.id();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(mounts.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_touch_keeps_mount_alive() {
        let mounts = registry(Duration::from_millis(150));
        let id = mounts.mount().await.id();

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(60)).await;
            assert!(mounts.touch(id).await);
        }

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!mounts.touch(id).await);
    }
}
