//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `OUTPOST_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `OUTPOST_BASE_URL` - Public URL of the site
//! - `OUTPOST_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `PAYPAL_CLIENT_ID` - PayPal REST app client ID
//! - `PAYPAL_CLIENT_SECRET` - PayPal REST app secret
//!
//! ## Optional
//! - `OUTPOST_HOST` - Bind address (default: 127.0.0.1)
//! - `OUTPOST_PORT` - Listen port (default: 3000)
//! - `OUTPOST_CLIENT_DIR` - Built client bundle (default: `crates/web/client`)
//! - `OUTPOST_LOCALES_DIR` - Default translation bundles (default: `crates/web/locales`)
//! - `OUTPOST_TRUST_PROXY_HEADERS` - Key rate limits on `X-Forwarded-For` and
//!   friends; only enable behind a proxy that sets them (default: false)
//! - `PAYPAL_MODE` - `sandbox` or `live` (default: sandbox)
//! - `PAYPAL_CURRENCY` - ISO currency for orders (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use outpost_core::CurrencyCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL, used for cookie security and PayPal return links
    pub base_url: String,
    pub session_secret: SecretString,
    /// Directory holding the pre-built client bundle
    pub client_dir: PathBuf,
    /// Directory holding `en.json` / `ar.json` translation bundles
    pub locales_dir: PathBuf,
    /// Whether client address headers from a fronting proxy are trusted
    pub trust_proxy_headers: bool,
    pub paypal: PayPalConfig,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Which PayPal REST environment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayPalMode {
    #[default]
    Sandbox,
    Live,
}

impl PayPalMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Live => "live",
        }
    }

    #[must_use]
    pub const fn api_base(self) -> &'static str {
        match self {
            Self::Sandbox => "https://api-m.sandbox.paypal.com",
            Self::Live => "https://api-m.paypal.com",
        }
    }
}

impl std::str::FromStr for PayPalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "live" | "production" => Ok(Self::Live),
            other => Err(format!("expected 'sandbox' or 'live', got '{other}'")),
        }
    }
}

/// PayPal REST API credentials.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub mode: PayPalMode,
    pub currency: CurrencyCode,
}

impl std::fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("mode", &self.mode)
            .field("currency", &self.currency)
            .finish()
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("OUTPOST_DATABASE_URL")?;
        let host = parse_env("OUTPOST_HOST", "127.0.0.1")?;
        let port = parse_env("OUTPOST_PORT", "3000")?;
        let base_url = get_required_env("OUTPOST_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("OUTPOST_BASE_URL".to_string(), e.to_string())
        })?;
        let session_secret = get_validated_secret("OUTPOST_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "OUTPOST_SESSION_SECRET")?;

        let client_dir = PathBuf::from(get_env_or_default(
            "OUTPOST_CLIENT_DIR",
            "crates/web/client",
        ));
        let locales_dir = PathBuf::from(get_env_or_default(
            "OUTPOST_LOCALES_DIR",
            "crates/web/locales",
        ));

        let paypal = PayPalConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            client_dir,
            locales_dir,
            trust_proxy_headers: parse_env("OUTPOST_TRUST_PROXY_HEADERS", "false")?,
            paypal,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls `Secure` cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl PayPalConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("PAYPAL_CLIENT_ID")?,
            client_secret: get_validated_secret("PAYPAL_CLIENT_SECRET")?,
            mode: parse_env("PAYPAL_MODE", "sandbox")?,
            currency: parse_env("PAYPAL_CURRENCY", "USD")?,
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

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
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

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn paypal() -> PayPalConfig {
        PayPalConfig {
            client_id: "AbC123client".to_string(),
            client_secret: SecretString::from("hunter2-paypal-credential"),
            mode: PayPalMode::Sandbox,
            currency: CurrencyCode::USD,
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_placeholder_secrets_rejected() {
        for value in ["your-api-key-here", "changeme123", "paypal-secret-value"] {
            let err = validate_secret_strength(value, "TEST_VAR").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(_, _)), "{value}");
        }
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        let result = validate_secret_strength(&"a".repeat(33), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_random_secret_accepted() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "S").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "S").is_ok());
    }

    #[test]
    fn test_parse_value() {
        let port: u16 = parse_value("OUTPOST_PORT", " 8080 ").unwrap();
        assert_eq!(port, 8080);
        let err = parse_value::<u16>("OUTPOST_PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "OUTPOST_PORT"));

        let mode: PayPalMode = parse_value("PAYPAL_MODE", "LIVE").unwrap();
        assert_eq!(mode, PayPalMode::Live);
        assert!(parse_value::<PayPalMode>("PAYPAL_MODE", "staging").is_err());

        let trust: bool = parse_value("OUTPOST_TRUST_PROXY_HEADERS", "true").unwrap();
        assert!(trust);

        let currency: CurrencyCode = parse_value("PAYPAL_CURRENCY", "sar").unwrap();
        assert_eq!(currency, CurrencyCode::SAR);
    }

    #[test]
    fn test_socket_addr_and_https() {
        let config = WebConfig {
            database_url: SecretString::from("postgres://localhost/outpost"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://play.example.net".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            client_dir: PathBuf::from("client"),
            locales_dir: PathBuf::from("locales"),
            trust_proxy_headers: false,
            paypal: paypal(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(config.is_https());
    }

    #[test]
    fn test_paypal_config_debug_redacts_secret() {
        let debug_output = format!("{:?}", paypal());
        assert!(debug_output.contains("AbC123client"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_paypal_api_base() {
        assert!(PayPalMode::Sandbox.api_base().contains("sandbox"));
        assert!(!PayPalMode::Live.api_base().contains("sandbox"));
    }
}
