//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; an empty environment runs the site with
//! offline flags and log-only tracking.
//!
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `FLAGS_URL` - Flag relay base URL; unset selects offline flags
//! - `FLAGS_SDK_KEY` - Flag relay SDK key (required when `FLAGS_URL` is set)
//! - `FLAGS_CACHE_TTL_SECS` - Evaluation cache TTL (default: 30)
//! - `FLAGS_TIMEOUT_MS` - Relay request timeout (default: 1500)
//! - `FLAGS_OVERRIDES_FILE` - JSON object of fixed values for offline flags
//! - `TRACKING_URL` - Event collector URL; unset logs events instead
//! - `TRACKING_WRITE_KEY` - Collector bearer token
//! - `HERO_AUTOPLAY_SECS` - Hero auto-advance period (default: 8)
//! - `HERO_MOUNT_IDLE_SECS` - Idle expiry for hero mounts (default: 1800)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Flag evaluation configuration
    pub flags: FlagsConfig,
    /// Analytics sink configuration
    pub tracking: TrackingConfig,
    /// Hero carousel timing
    pub hero: HeroConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Flag evaluation configuration.
#[derive(Debug, Clone)]
pub struct FlagsConfig {
    /// Remote relay; `None` selects offline flags.
    pub relay: Option<FlagRelayConfig>,
    /// How long an evaluation is reused for the same context.
    pub cache_ttl: Duration,
    /// Fixed values served by offline flags.
    pub overrides_file: Option<PathBuf>,
}

/// Flag relay connection settings.
#[derive(Debug, Clone)]
pub struct FlagRelayConfig {
    pub url: Url,
    pub sdk_key: SecretString,
    pub timeout: Duration,
}

/// Event collector settings.
#[derive(Debug, Clone, Default)]
pub struct TrackingConfig {
    /// Collector endpoint; `None` writes events to the log.
    pub url: Option<Url>,
    pub write_key: Option<SecretString>,
}

/// Hero carousel timing.
#[derive(Debug, Clone)]
pub struct HeroConfig {
    /// Auto-advance period.
    pub autoplay: Duration,
    /// Hero mounts without any request for this long are dropped.
    pub mount_idle: Duration,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            flags: FlagsConfig::default(),
            tracking: TrackingConfig::default(),
            hero: HeroConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            relay: None,
            cache_ttl: Duration::from_secs(30),
            overrides_file: None,
        }
    }
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            autoplay: Duration::from_secs(8),
            mount_idle: Duration::from_secs(30 * 60),
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable fails to parse, if `FLAGS_URL` is
    /// set without `FLAGS_SDK_KEY`, or if a secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: parse_env("SITE_HOST", "127.0.0.1")?,
            port: parse_env("SITE_PORT", "3000")?,
            base_url: get_env_or_default("SITE_BASE_URL", "http://localhost:3000"),
            flags: FlagsConfig::from_env()?,
            tracking: TrackingConfig::from_env()?,
            hero: HeroConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (session cookies are `Secure`).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl FlagsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let relay = match get_optional_env("FLAGS_URL") {
            Some(raw) => Some(FlagRelayConfig {
                url: parse_url("FLAGS_URL", &raw)?,
                sdk_key: get_validated_secret("FLAGS_SDK_KEY")?,
                timeout: Duration::from_millis(parse_env("FLAGS_TIMEOUT_MS", "1500")?),
            }),
            None => None,
        };

        Ok(Self {
            relay,
            cache_ttl: Duration::from_secs(parse_env("FLAGS_CACHE_TTL_SECS", "30")?),
            overrides_file: get_optional_env("FLAGS_OVERRIDES_FILE").map(PathBuf::from),
        })
    }
}

impl TrackingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = get_optional_env("TRACKING_URL")
            .map(|raw| parse_url("TRACKING_URL", &raw))
            .transpose()?;
        let write_key = match get_optional_env("TRACKING_WRITE_KEY") {
            Some(_) => Some(get_validated_secret("TRACKING_WRITE_KEY")?),
            None => None,
        };
        Ok(Self { url, write_key })
    }
}

impl HeroConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let autoplay_secs: u64 = parse_env("HERO_AUTOPLAY_SECS", "8")?;
        if autoplay_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "HERO_AUTOPLAY_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            autoplay: Duration::from_secs(autoplay_secs),
            mount_idle: Duration::from_secs(parse_env("HERO_MOUNT_IDLE_SECS", "1800")?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Reject secrets that look like copied placeholders.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Expose a secret for use as an HTTP header value.
pub(crate) fn bearer(secret: &SecretString) -> String {
    format!("Bearer {}", secret.expose_secret())
}
