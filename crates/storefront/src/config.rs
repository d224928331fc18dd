//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOP_CACHE_PATH` - `SQLite` file for the durable cache (default: shop-shop.db)
//! - `SHOP_API_URL` - GraphQL endpoint; when unset the storefront runs offline
//! - `SHOP_AUTH_TOKEN` - Bearer token of the logged-in shopper
//! - `SHOP_CHECKOUT_URL` - Payment page base (default: <https://checkout.stripe.com/pay>)
//! - `SHOP_REMOTE_TIMEOUT_SECS` - Seconds before a remote call counts as failed (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CACHE_PATH: &str = "shop-shop.db";
const DEFAULT_CHECKOUT_URL: &str = "https://checkout.stripe.com/pay";
const DEFAULT_REMOTE_TIMEOUT_SECS: &str = "10";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront configuration.
///
/// Implements `Debug` manually to redact the auth token.
#[derive(Clone)]
pub struct ShopConfig {
    /// Durable cache database file
    pub cache_path: PathBuf,
    /// GraphQL endpoint, `None` for offline mode
    pub api_url: Option<Url>,
    /// Shopper's bearer token
    pub auth_token: Option<SecretString>,
    /// Payment page base URL
    pub checkout_url: Url,
    /// Upper bound on a single remote call
    pub remote_timeout: Duration,
}

impl std::fmt::Debug for ShopConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopConfig")
            .field("cache_path", &self.cache_path)
            .field("api_url", &self.api_url.as_ref().map(Url::as_str))
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("checkout_url", &self.checkout_url.as_str())
            .field("remote_timeout", &self.remote_timeout)
            .finish()
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or the token looks
    /// like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let cache_path = PathBuf::from(get_or("SHOP_CACHE_PATH", DEFAULT_CACHE_PATH));

        let api_url = get("SHOP_API_URL")
            .map(|raw| parse_url("SHOP_API_URL", &raw))
            .transpose()?;

        let auth_token = get("SHOP_AUTH_TOKEN")
            .map(|raw| {
                validate_token(&raw, "SHOP_AUTH_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(raw))
            })
            .transpose()?;

        let checkout_url = parse_url(
            "SHOP_CHECKOUT_URL",
            &get_or("SHOP_CHECKOUT_URL", DEFAULT_CHECKOUT_URL),
        )?;

        let timeout_secs = get_or("SHOP_REMOTE_TIMEOUT_SECS", DEFAULT_REMOTE_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOP_REMOTE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_REMOTE_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            cache_path,
            api_url,
            auth_token,
            checkout_url,
            remote_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Reject tokens that were obviously copied from a template.
fn validate_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();
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
