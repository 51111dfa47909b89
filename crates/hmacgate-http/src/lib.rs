//! HTTP layer for HmacGate.
//!
//! This crate puts [`hmacgate_auth::HmacValidator`] in front of any hyper
//! service:
//!
//! - **Service**: [`HmacAuthService`], a hyper `Service` that validates the
//!   credential headers and forwards or rejects the request
//! - **Errors**: [`ErrorKind`] and [`GateError`], mapped to HTTP status codes
//! - **Response helpers**: the `{"msg", "data"}` JSON envelope

pub mod error;
pub mod response;
pub mod service;

pub use error::{ErrorKind, GateError};
pub use response::{Envelope, GateResponseBody, error_to_response, json_response};
pub use service::HmacAuthService;
