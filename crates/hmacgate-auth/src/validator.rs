//! Ordered validation of signed requests.
//!
//! [`HmacValidator::validate`] runs the checks in a fixed order and stops at
//! the first failure:
//!
//! 1. App ID header present and non-empty
//! 2. App ID registered (before any cryptographic work)
//! 3. Nonce not already in the ledger
//! 4. Timestamp parses as a signed 64-bit integer
//! 5. Timestamp not older than the nonce expiration
//! 6. Signature matches `HMAC-SHA512(secret, nonce || timestamp)`
//! 7. Nonce committed to the ledger
//!
//! The ledger is only written in step 7, so a rejected request leaves no
//! trace in it. Timestamps in the future are accepted.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::credentials::CallerRegistry;
use crate::error::{AuthError, ConfigError, SignatureError};
use crate::headers::Credentials;
use crate::ledger::{NonceLedger, NonceMarker};
use crate::signature::{signing_payload, verify};

/// The result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedApp {
    /// The app ID that signed the request.
    pub app_id: String,
}

/// Validates request credentials against a caller registry and nonce ledger.
#[derive(Clone)]
pub struct HmacValidator {
    registry: Arc<dyn CallerRegistry>,
    ledger: Arc<dyn NonceLedger>,
    nonce_expiration: Duration,
}

impl std::fmt::Debug for HmacValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacValidator")
            .field("nonce_expiration", &self.nonce_expiration)
            .finish_non_exhaustive()
    }
}

impl HmacValidator {
    /// Create a validator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroNonceExpiration`] if `nonce_expiration` is zero.
    pub fn new(
        registry: Arc<dyn CallerRegistry>,
        ledger: Arc<dyn NonceLedger>,
        nonce_expiration: Duration,
    ) -> Result<Self, ConfigError> {
        if nonce_expiration.is_zero() {
            return Err(ConfigError::ZeroNonceExpiration);
        }
        Ok(Self {
            registry,
            ledger,
            nonce_expiration,
        })
    }

    /// Validate a request's credentials, committing its nonce on success.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the first failing check.
    pub async fn validate(&self, creds: &Credentials) -> Result<AuthenticatedApp, AuthError> {
        self.validate_at(creds, Utc::now()).await
    }

    async fn validate_at(
        &self,
        creds: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedApp, AuthError> {
        if creds.app_id.is_empty() {
            return Err(AuthError::MissingAppId);
        }

        let secret = self.registry.get_secret(&creds.app_id)?;

        if self.ledger.get(&creds.nonce).await.is_some() {
            return Err(AuthError::NonceAlreadyUsed);
        }

        let timestamp: i64 = creds
            .timestamp
            .parse()
            .map_err(AuthError::InvalidTimestamp)?;

        self.check_freshness(timestamp, now)?;

        let payload = signing_payload(&creds.nonce, &creds.timestamp);
        if !verify(secret.as_bytes(), &payload, &creds.signature)? {
            return Err(SignatureError::Mismatch.into());
        }

        if !self
            .ledger
            .insert_if_absent(&creds.nonce, NonceMarker, self.nonce_expiration)
            .await
        {
            debug!(app_id = %creds.app_id, "nonce committed concurrently by another request");
            return Err(AuthError::NonceAlreadyUsed);
        }

        Ok(AuthenticatedApp {
            app_id: creds.app_id.clone(),
        })
    }

    fn check_freshness(&self, timestamp: i64, now: DateTime<Utc>) -> Result<(), AuthError> {
        let age_ms = now
            .timestamp_millis()
            .saturating_sub(timestamp.saturating_mul(1000));
        let limit_ms = i64::try_from(self.nonce_expiration.as_millis()).unwrap_or(i64::MAX);

        if age_ms <= limit_ms {
            return Ok(());
        }

        let issued_at = DateTime::from_timestamp(timestamp, 0)
            .map_or_else(|| timestamp.to_string(), |t| t.to_rfc3339());
        Err(AuthError::TimestampExpired {
            timestamp,
            issued_at,
            age: Duration::from_millis(age_ms.unsigned_abs()),
            expiration: self.nonce_expiration,
        })
    }
}
