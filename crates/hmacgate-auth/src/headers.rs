//! Credential headers carried by every signed request.
//!
//! A signed request carries four headers:
//!
//! ```text
//! X-Auth-App-ID:    <caller identifier>
//! X-Auth-Nonce:     <unique per request>
//! X-Auth-Timestamp: <unix seconds>
//! X-Auth-Signature: hex(HMAC-SHA512(secret, nonce || timestamp))
//! ```

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::signature::{sign, signing_payload};

/// Header carrying the caller's app ID.
pub const HEADER_APP_ID: &str = "X-Auth-App-ID";
/// Header carrying the hex-encoded signature.
pub const HEADER_SIGNATURE: &str = "X-Auth-Signature";
/// Header carrying the request nonce.
pub const HEADER_NONCE: &str = "X-Auth-Nonce";
/// Header carrying the Unix timestamp in seconds.
pub const HEADER_TIMESTAMP: &str = "X-Auth-Timestamp";

/// The credential tuple of a single request.
///
/// Fields hold the raw header values. A missing header, or one whose value is
/// not visible ASCII, is read as the empty string; the validator decides what
/// an empty field means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Caller identifier.
    pub app_id: String,
    /// Caller-supplied nonce.
    pub nonce: String,
    /// Unix seconds as a base-10 string.
    pub timestamp: String,
    /// Lowercase hex signature.
    pub signature: String,
}

impl Credentials {
    /// Create credentials from raw values.
    pub fn new(
        app_id: impl Into<String>,
        nonce: impl Into<String>,
        timestamp: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            nonce: nonce.into(),
            timestamp: timestamp.into(),
            signature: signature.into(),
        }
    }

    /// Sign a fresh request for `app_id`: a random UUID v4 nonce and the
    /// current Unix time.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmacgate_auth::headers::Credentials;
    ///
    /// let creds = Credentials::sign("billing", b"shared-secret");
    /// assert_eq!(creds.app_id, "billing");
    /// assert_eq!(creds.signature.len(), 128);
    /// ```
    pub fn sign(app_id: impl Into<String>, secret: &[u8]) -> Self {
        let nonce = uuid::Uuid::new_v4().to_string();
        Self::sign_with(app_id, secret, nonce, chrono::Utc::now().timestamp())
    }

    /// Sign a request with an explicit nonce and timestamp.
    pub fn sign_with(
        app_id: impl Into<String>,
        secret: &[u8],
        nonce: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        let nonce = nonce.into();
        let timestamp = timestamp.to_string();
        let signature = sign(secret, &signing_payload(&nonce, &timestamp));
        Self::new(app_id, nonce, timestamp, signature)
    }

    /// Read the credential headers from a request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            app_id: header_str(headers, HEADER_APP_ID),
            nonce: header_str(headers, HEADER_NONCE),
            timestamp: header_str(headers, HEADER_TIMESTAMP),
            signature: header_str(headers, HEADER_SIGNATURE),
        }
    }

    /// Write the credential headers onto a request, replacing earlier values.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be represented as a header value.
    pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), http::Error> {
        for (name, value) in [
            (HEADER_APP_ID, &self.app_id),
            (HEADER_NONCE, &self.nonce),
            (HEADER_TIMESTAMP, &self.timestamp),
            (HEADER_SIGNATURE, &self.signature),
        ] {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            headers.insert(name, HeaderValue::from_str(value)?);
        }
        Ok(())
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    let Some(value) = headers.get(name) else {
        return String::new();
    };
    if let Ok(value) = value.to_str() {
        value.to_owned()
    } else {
        debug!(header = name, "header value is not visible ASCII, reading it as empty");
        String::new()
    }
}
