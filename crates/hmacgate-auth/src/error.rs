//! Error types for HMAC request authentication.
//!
//! [`AuthError`] carries one variant per rejection reason of the validation
//! pipeline. Every variant maps to the same `Unauthorized` outcome at the HTTP
//! boundary; the variants exist so operators can tell failures apart in logs.

use std::num::ParseIntError;
use std::time::Duration;

/// Errors produced while validating a signed request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The app ID header is absent or empty.
    #[error("request header X-Auth-App-ID is missing or empty")]
    MissingAppId,

    /// The app ID is not present in the caller registry.
    #[error("request header X-Auth-App-ID value '{0}' is an unknown app ID")]
    UnknownAppId(String),

    /// The nonce was committed by an earlier request and has not expired yet.
    #[error("nonce was already used")]
    NonceAlreadyUsed,

    /// The timestamp header is not a base-10 signed 64-bit integer.
    #[error("invalid authorization timestamp: {0}")]
    InvalidTimestamp(#[source] ParseIntError),

    /// The timestamp lies further in the past than the nonce expiration.
    #[error(
        "timestamp '{issued_at}' (unix second {timestamp}) has age {age:?} \
         older than nonce expiration {expiration:?}"
    )]
    TimestampExpired {
        /// Raw Unix seconds from the request.
        timestamp: i64,
        /// RFC 3339 rendering of the timestamp, or the raw value when out of range.
        issued_at: String,
        /// How far the timestamp lies behind the current time.
        age: Duration,
        /// The configured freshness window.
        expiration: Duration,
    },

    /// The signature could not be decoded or does not match.
    #[error("invalid authorization signature: {0}")]
    InvalidSignature(#[from] SignatureError),
}

/// Failures of [`verify`](crate::signature::verify).
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The signature is not valid hex.
    #[error("malformed signature: {0}")]
    Decode(#[from] hex::FromHexError),

    /// The signature decodes but differs from the expected digest.
    #[error("signature mismatch")]
    Mismatch,
}

/// Errors raised while constructing a validator.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The nonce expiration must be a positive duration.
    #[error("nonce expiration must be greater than zero")]
    ZeroNonceExpiration,
}
