//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_API_KEY` - Web API key for the Firebase project
//! - `FIREBASE_PROJECT_ID` - Firebase project ID (Firestore documents)
//! - `FIREBASE_DATABASE_URL` - Realtime Database URL (product catalog)
//!
//! ## Optional
//! - `CART_STORAGE_DIR` - Directory holding persisted cart snapshots (default: .storefront)
//! - `CART_STORAGE_KEY` - Storage key of the cart snapshot (default: cart)
//! - `CART_PERSIST_DEBOUNCE_MS` - Quiet period before the cart is written (default: 500)
//! - `CART_DEFAULT_STOCK_LIMIT` - Stock limit for items without one (default: 100)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog response cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::cart::CartSettings;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Firebase project configuration
    pub firebase: FirebaseConfig,
    /// Cart persistence settings
    pub cart: CartConfig,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Firebase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Web API key
    pub api_key: SecretString,
    /// Project ID used in Firestore document paths
    pub project_id: String,
    /// Realtime Database root URL
    pub database_url: Url,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("database_url", &self.database_url.as_str())
            .finish()
    }
}

/// Cart persistence configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Directory holding one file per storage key
    pub storage_dir: PathBuf,
    /// Store behavior (storage key, debounce, stock default)
    pub settings: CartSettings,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let firebase = FirebaseConfig::from_env()?;
        let cart = CartConfig::from_env()?;
        let catalog_cache_ttl =
            Duration::from_secs(parse_env_or_default("CATALOG_CACHE_TTL_SECS", 300_u64)?);

        Ok(Self {
            firebase,
            cart,
            catalog_cache_ttl,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let database_url = get_required_env("FIREBASE_DATABASE_URL")?;
        Ok(Self {
            api_key: SecretString::from(get_required_env("FIREBASE_API_KEY")?),
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            database_url: parse_database_url(&database_url)?,
        })
    }
}

impl CartConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = CartSettings::default();

        let default_stock_limit =
            parse_env_or_default("CART_DEFAULT_STOCK_LIMIT", defaults.default_stock_limit)?;
        if default_stock_limit == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_DEFAULT_STOCK_LIMIT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let debounce_ms = parse_env_or_default(
            "CART_PERSIST_DEBOUNCE_MS",
            u64::try_from(defaults.persist_debounce.as_millis()).unwrap_or(500),
        )?;

        Ok(Self {
            storage_dir: PathBuf::from(get_env_or_default("CART_STORAGE_DIR", ".storefront")),
            settings: CartSettings {
                storage_key: get_env_or_default("CART_STORAGE_KEY", &defaults.storage_key),
                persist_debounce: Duration::from_millis(debounce_ms),
                default_stock_limit,
            },
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse the Realtime Database URL, requiring an http(s) scheme.
fn parse_database_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidEnvVar("FIREBASE_DATABASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "FIREBASE_DATABASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}
