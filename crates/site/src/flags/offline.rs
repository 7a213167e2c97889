//! Offline flag evaluation.
//!
//! Serves the catalog defaults plus a fixed set of overrides, with no
//! network access. The visitor's own VIP attribute is reported as
//! `vip-gaming-experience` so the segment toggle keeps working without a
//! flag service; an explicit override for that key still wins.

use std::path::Path;

use async_trait::async_trait;
use serde_json::{Map, Value};

use omni_core::{FlagKey, VisitorContext};

use super::{FlagError, FlagEvaluator, FlagSet};

/// Flag evaluator used when no relay is configured.
#[derive(Debug, Clone, Default)]
pub struct OfflineFlags {
    overrides: Map<String, Value>,
}

impl OfflineFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `overrides` on top of the defaults.
    #[must_use]
    pub const fn with_overrides(overrides: Map<String, Value>) -> Self {
        Self { overrides }
    }

    /// Load overrides from a JSON object file.
    ///
    /// # Errors
    ///
    /// Returns `FlagError::Io` if the file cannot be read and
    /// `FlagError::Parse` if it is not a JSON object.
    pub fn from_file(path: &Path) -> Result<Self, FlagError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FlagError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides: Map<String, Value> = serde_json::from_str(&raw)
            .map_err(|e| FlagError::Parse(format!("{}: {e}", path.display())))?;

        for key in overrides.keys() {
            if !FlagKey::ALL.iter().any(|known| known.as_str() == key) {
                tracing::warn!(key = %key, "override for a flag outside the catalog");
            }
        }

        Ok(Self::with_overrides(overrides))
    }
}

#[async_trait]
impl FlagEvaluator for OfflineFlags {
    async fn evaluate_all(&self, context: &VisitorContext) -> Result<FlagSet, FlagError> {
        let mut flags = FlagSet::default();
        flags.set(FlagKey::Vip, context.vip_status().as_str());
        for (key, value) in &self.overrides {
            flags.values.insert(key.clone(), value.clone());
        }
        Ok(flags)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use omni_core::{Country, GameFlags, UiVariant};

    use super::*;

    #[tokio::test]
    async fn test_defaults_for_regular_visitor() {
        let flags = OfflineFlags::new()
            .evaluate_all(&VisitorContext::default())
            .await
            .unwrap()
            .game_flags();
        assert_eq!(flags, GameFlags::default());
    }

    #[tokio::test]
    async fn test_mirrors_vip_attribute() {
        let flags = OfflineFlags::new()
            .evaluate_all(&VisitorContext::vip(Country::Be))
            .await
            .unwrap()
            .game_flags();
        assert!(flags.is_vip());
    }

    #[tokio::test]
    async fn test_overrides_win() {
        let overrides = serde_json::json!({
            "vip-gaming-experience": "none",
            "ui.variant": "bold",
        });
        let Value::Object(overrides) = overrides else {
            panic!("expected object");
        };
        let flags = OfflineFlags::with_overrides(overrides)
            .evaluate_all(&VisitorContext::vip(Country::Gb))
            .await
            .unwrap()
            .game_flags();
        assert!(!flags.is_vip());
        assert_eq!(flags.ui_variant, UiVariant::Bold);
    }

    #[test]
    fn test_from_file_rejects_non_object() {
        let path = std::env::temp_dir().join(format!("omni-flags-{}.json", std::process::id()));
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let result = OfflineFlags::from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(FlagError::Parse(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = OfflineFlags::from_file(Path::new("/nonexistent/omni-flags.json"));
        let Err(error) = result else {
            panic!("expected an error for a missing file");
        };
        assert!(matches!(
            &error,
            FlagError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        ));
        assert!(error.to_string().contains("/nonexistent/omni-flags.json"));
    }
}
