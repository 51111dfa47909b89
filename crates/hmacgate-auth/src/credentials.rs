//! Caller registry trait and implementations.
//!
//! This module defines the [`CallerRegistry`] trait for resolving the shared
//! secret of a calling application, along with a [`StaticCallerRegistry`]
//! populated once from configuration.

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// A pre-shared secret. Its `Debug` output never contains the secret bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

impl From<&str> for SharedSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for SharedSecret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

/// Trait for looking up a caller's shared secret by app ID.
///
/// Lookups are exact and case-sensitive. Implementations are read-only after
/// construction.
pub trait CallerRegistry: Send + Sync {
    /// Retrieve the shared secret for the given app ID.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownAppId`] if the app ID is not registered.
    fn get_secret(&self, app_id: &str) -> Result<SharedSecret, AuthError>;
}

/// An in-memory caller registry backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::credentials::{CallerRegistry, StaticCallerRegistry};
///
/// let registry = StaticCallerRegistry::new(vec![
///     ("billing".to_owned(), "billing-secret".into()),
/// ]);
///
/// let secret = registry.get_secret("billing").unwrap();
/// assert_eq!(secret.as_bytes(), b"billing-secret");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCallerRegistry {
    secrets: HashMap<String, SharedSecret>,
}

impl StaticCallerRegistry {
    /// Create a registry from an iterable of (app_id, secret) pairs.
    pub fn new(secrets: impl IntoIterator<Item = (String, SharedSecret)>) -> Self {
        Self {
            secrets: secrets.into_iter().collect(),
        }
    }

    /// Number of registered callers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether no caller is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl CallerRegistry for StaticCallerRegistry {
    fn get_secret(&self, app_id: &str) -> Result<SharedSecret, AuthError> {
        self.secrets
            .get(app_id)
            .cloned()
            .ok_or_else(|| AuthError::UnknownAppId(app_id.to_owned()))
    }
}
