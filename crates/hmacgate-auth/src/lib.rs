//! HMAC-SHA512 request authentication for hmacgate.
//!
//! This crate verifies that an incoming request was signed by a registered
//! caller with its pre-shared secret, that the request is fresh, and that its
//! nonce has not been seen before.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use hmacgate_auth::{Credentials, HmacValidator, InMemoryNonceLedger, StaticCallerRegistry};
//!
//! # tokio_test_runtime(async {
//! let registry = StaticCallerRegistry::new(vec![("billing".to_owned(), "secret".into())]);
//! let validator = HmacValidator::new(
//!     Arc::new(registry),
//!     Arc::new(InMemoryNonceLedger::new()),
//!     Duration::from_secs(300),
//! )
//! .unwrap();
//!
//! let creds = Credentials::sign("billing", b"secret");
//! let app = validator.validate(&creds).await.unwrap();
//! assert_eq!(app.app_id, "billing");
//!
//! // A replay of the same credentials is rejected.
//! assert!(validator.validate(&creds).await.is_err());
//! # });
//! # fn tokio_test_runtime(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! # Modules
//!
//! - [`credentials`] - Caller registry trait and static implementation
//! - [`error`] - Authentication error types
//! - [`headers`] - Credential header names and extraction
//! - [`ledger`] - Replay-protection nonce ledger
//! - [`signature`] - HMAC-SHA512 signing and verification
//! - [`validator`] - Ordered request validation

pub mod credentials;
pub mod error;
pub mod headers;
pub mod ledger;
pub mod signature;
pub mod validator;

pub use credentials::{CallerRegistry, SharedSecret, StaticCallerRegistry};
pub use error::{AuthError, ConfigError, SignatureError};
pub use headers::{
    Credentials, HEADER_APP_ID, HEADER_NONCE, HEADER_SIGNATURE, HEADER_TIMESTAMP,
};
pub use ledger::{InMemoryNonceLedger, NonceLedger, NonceMarker};
pub use signature::{sign, signing_payload, verify};
pub use validator::{AuthenticatedApp, HmacValidator};
