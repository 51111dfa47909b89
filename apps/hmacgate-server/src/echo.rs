//! Downstream service that answers every admitted request.

use std::convert::Infallible;
use std::future::Ready;

use http::StatusCode;
use hyper::service::Service;
use serde::Serialize;

use hmacgate_http::{Envelope, GateResponseBody, json_response};

/// Request summary echoed back to the caller.
#[derive(Debug, Serialize)]
struct RequestSummary<'a> {
    method: &'a str,
    path: &'a str,
}

/// Answers 200 with the method and path of the request it received.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoService;

impl<B> Service<http::Request<B>> for EchoService {
    type Response = http::Response<GateResponseBody>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let summary = RequestSummary {
            method: req.method().as_str(),
            path: req.uri().path(),
        };
        let response = json_response(StatusCode::OK, &Envelope::with_data("authorized", summary));
        std::future::ready(Ok(response))
    }
}
