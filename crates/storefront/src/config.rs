//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `WHATSAPP_ORDER_NUMBER` - Number that receives order messages (digits, optional leading `+`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_STORE_NAME` - Shop name used in order messages (default: Ashok Asthmi)
//! - `STOREFRONT_CART_KEY` - Session key holding the cart (default: `ashok_asthmi_cart`)
//! - `STOREFRONT_LOW_STOCK_THRESHOLD` - Stock below this shows "Only N left" (default: 10)
//! - `STOREFRONT_MAX_PRICE_FILTER` - Upper bound of the listing price filter (default: 5000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use asthmi_core::{DEFAULT_LOW_STOCK_THRESHOLD, Money};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::cart::DEFAULT_CART_KEY;

/// Default shop name shown in order messages.
pub const DEFAULT_STORE_NAME: &str = "Ashok Asthmi";

/// Default upper bound of the listing price filter, in rupees.
pub const DEFAULT_MAX_PRICE_FILTER: u64 = 5000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Shop name used in order messages
    pub store_name: String,
    /// Session key holding the serialized cart
    pub cart_key: String,
    /// Stock count below which a product is flagged as low
    pub low_stock_threshold: u32,
    /// Upper bound of the listing price filter
    pub max_price_filter: Money,
    /// WhatsApp order handoff configuration
    pub whatsapp: WhatsAppConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// WhatsApp order handoff configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppConfig {
    /// Destination number in international format, without the leading `+`
    pub order_number: String,
}

impl WhatsAppConfig {
    /// Build from a phone number such as `+910000000000`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the number has anything other
    /// than digits after an optional leading `+`.
    pub fn new(number: &str) -> Result<Self, ConfigError> {
        let digits = number.trim().trim_start_matches('+');
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidEnvVar(
                "WHATSAPP_ORDER_NUMBER".to_string(),
                format!("expected digits with optional leading '+', got {number:?}"),
            ));
        }
        Ok(Self {
            order_number: digits.to_string(),
        })
    }
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

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let low_stock_threshold = parse_env_or_default::<u32>(
            "STOREFRONT_LOW_STOCK_THRESHOLD",
            &DEFAULT_LOW_STOCK_THRESHOLD.to_string(),
        )?;
        let max_price_filter = Money::from_rupees(parse_env_or_default::<u64>(
            "STOREFRONT_MAX_PRICE_FILTER",
            &DEFAULT_MAX_PRICE_FILTER.to_string(),
        )?);

        let whatsapp = WhatsAppConfig::new(&get_required_env("WHATSAPP_ORDER_NUMBER")?)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            store_name: get_env_or_default("STOREFRONT_STORE_NAME", DEFAULT_STORE_NAME),
            cart_key: get_env_or_default("STOREFRONT_CART_KEY", DEFAULT_CART_KEY),
            low_stock_threshold,
            max_price_filter,
            whatsapp,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable. A blank value counts as missing.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value used when unset or blank.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset or blank.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
