//! JSON response envelope and error formatting.
//!
//! Every body the gate writes has the shape
//!
//! ```json
//! { "msg": "invalid authorization" }
//! ```
//!
//! or, when a payload is attached, `{"msg": "...", "data": {...}}`.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::error::GateError;

/// Body of every response the gate answers on its own: buffered JSON.
pub type GateResponseBody = Full<Bytes>;

/// Content type of every JSON response.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The `{"msg", "data"}` response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    /// Human-readable message.
    pub msg: &'a str,
    /// Optional payload. Omitted from the output when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<'a> Envelope<'a, ()> {
    /// An envelope carrying only a message.
    #[must_use]
    pub fn message(msg: &'a str) -> Self {
        Self { msg, data: None }
    }
}

impl<'a, T: Serialize> Envelope<'a, T> {
    /// An envelope carrying a message and a payload.
    #[must_use]
    pub fn with_data(msg: &'a str, data: T) -> Self {
        Self {
            msg,
            data: Some(data),
        }
    }
}

/// Serialize `value` as a JSON response with the given status.
///
/// A value that cannot be serialized yields a 500 response instead.
#[must_use]
pub fn json_response(
    status: StatusCode,
    value: &impl Serialize,
) -> http::Response<GateResponseBody> {
    match serde_json::to_vec(value) {
        Ok(json) => build(status, json),
        Err(err) => {
            error!(error = %err, "failed to serialize response body");
            error_to_response(&GateError::internal("internal server error"))
        }
    }
}

/// Convert a `GateError` into a complete HTTP error response.
///
/// Only the error's message reaches the body; its source is left out.
#[must_use]
pub fn error_to_response(error: &GateError) -> http::Response<GateResponseBody> {
    let json = serde_json::json!({ "msg": error.message }).to_string();
    build(error.status_code(), json.into_bytes())
}

/// Attach the request id header to a response.
pub fn set_request_id<B>(response: &mut http::Response<B>, request_id: &str) {
    if let Ok(hv) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, hv);
    }
}

fn build(status: StatusCode, json: Vec<u8>) -> http::Response<GateResponseBody> {
    let mut response = http::Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}
