//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `QKART_API_ENDPOINT` - Backend base URL (default: `http://localhost:8082/api/v1`)
//! - `QKART_SESSION_FILE` - Session store path (default: `.qkart/session.json`)
//! - `QKART_SEARCH_DEBOUNCE_MS` - Search debounce window (default: 500)
//! - `QKART_CATALOG_CACHE_TTL_SECS` - Catalog cache TTL (default: cache disabled)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_ENDPOINT: &str = "http://localhost:8082/api/v1";
const DEFAULT_SESSION_FILE: &str = ".qkart/session.json";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the QKart REST API, without a trailing slash
    pub api_endpoint: Url,
    /// Where the session token is persisted between runs
    pub session_file: PathBuf,
    /// Quiet period before a search request is issued
    pub search_debounce: Duration,
    /// Catalog cache TTL; `None` disables the cache
    pub catalog_cache_ttl: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_endpoint = parse_endpoint(
            "QKART_API_ENDPOINT",
            &lookup("QKART_API_ENDPOINT").unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
        )?;

        let session_file = lookup("QKART_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        let search_debounce = Duration::from_millis(
            lookup("QKART_SEARCH_DEBOUNCE_MS")
                .map(|v| parse_u64("QKART_SEARCH_DEBOUNCE_MS", &v))
                .transpose()?
                .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS),
        );

        let catalog_cache_ttl = lookup("QKART_CATALOG_CACHE_TTL_SECS")
            .map(|v| parse_u64("QKART_CATALOG_CACHE_TTL_SECS", &v))
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            api_endpoint,
            session_file,
            search_debounce,
            catalog_cache_ttl,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Base URL as a string with any trailing slash removed.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.api_endpoint.as_str().trim_end_matches('/')
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and validate the API base URL.
fn parse_endpoint(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
