//! Configuration management for HmacGate.
//!
//! All configuration is driven by environment variables.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{HmacGateError, HmacGateResult};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines with ANSI colors.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = HmacGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("text") {
            Ok(Self::Text)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(HmacGateError::Config(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{s}'"
            )))
        }
    }
}

/// A registered caller and its shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AppSecret {
    /// Caller identifier.
    pub app_id: String,
    /// Pre-shared secret.
    pub secret: String,
}

impl fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSecret")
            .field("app_id", &self.app_id)
            .field("secret", &"..")
            .finish()
    }
}

/// Global configuration for HmacGate.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Bind address of the server.
    pub listen: String,
    /// Log level.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Freshness window of request timestamps and TTL of committed nonces.
    pub nonce_expiration: Duration,
    /// Period of the background nonce purge.
    pub nonce_purge_interval: Duration,
    /// Registered callers.
    pub app_secrets: Vec<AppSecret>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_owned(),
            log_level: "info".to_owned(),
            log_format: LogFormat::Text,
            nonce_expiration: Duration::from_secs(300),
            nonce_purge_interval: Duration::from_secs(60),
            app_secrets: Vec::new(),
        }
    }
}

impl GateConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`HmacGateError::Config`] if a variable is malformed.
    pub fn from_env() -> HmacGateResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`HmacGateError::Config`] if a variable is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> HmacGateResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("GATE_LISTEN") {
            config.listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            config.log_format = v.parse()?;
        }
        if let Some(v) = lookup("NONCE_EXPIRATION_SECS") {
            config.nonce_expiration = positive_secs("NONCE_EXPIRATION_SECS", &v)?;
        }
        if let Some(v) = lookup("NONCE_PURGE_INTERVAL_SECS") {
            config.nonce_purge_interval = positive_secs("NONCE_PURGE_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("HMAC_APP_SECRETS") {
            config.app_secrets = parse_app_secrets(&v)?;
        }

        Ok(config)
    }
}

fn positive_secs(key: &str, value: &str) -> HmacGateResult<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(HmacGateError::Config(format!(
            "{key} must be greater than zero"
        ))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(HmacGateError::Config(format!(
            "{key} must be a number of seconds, got '{value}': {e}"
        ))),
    }
}

/// Parse a comma-separated list of `app-id=secret` pairs.
///
/// Whitespace around entries, app IDs and secrets is trimmed and empty entries
/// are skipped. The secret is everything after the first `=`.
///
/// # Errors
///
/// Returns [`HmacGateError::Config`] for an entry without `=`, an empty app
/// ID or secret, or an app ID listed twice.
///
/// # Examples
///
/// ```
/// use hmacgate_core::parse_app_secrets;
///
/// let secrets = parse_app_secrets("billing=s3cr3t, search=a=b").unwrap();
/// assert_eq!(secrets[0].app_id, "billing");
/// assert_eq!(secrets[1].secret, "a=b");
/// ```
pub fn parse_app_secrets(raw: &str) -> HmacGateResult<Vec<AppSecret>> {
    let mut seen = HashSet::new();
    let mut secrets = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((app_id, secret)) = entry.split_once('=') else {
            return Err(HmacGateError::Config(
                "HMAC_APP_SECRETS entries must have the form app-id=secret".to_owned(),
            ));
        };
        let (app_id, secret) = (app_id.trim(), secret.trim());
        if app_id.is_empty() {
            return Err(HmacGateError::Config(
                "HMAC_APP_SECRETS contains an empty app ID".to_owned(),
            ));
        }
        if secret.is_empty() {
            return Err(HmacGateError::Config(format!(
                "HMAC_APP_SECRETS has an empty secret for app ID '{app_id}'"
            )));
        }
        if !seen.insert(app_id.to_owned()) {
            return Err(HmacGateError::Config(format!(
                "HMAC_APP_SECRETS lists app ID '{app_id}' more than once"
            )));
        }
        secrets.push(AppSecret {
            app_id: app_id.to_owned(),
            secret: secret.to_owned(),
        });
    }

    Ok(secrets)
}
