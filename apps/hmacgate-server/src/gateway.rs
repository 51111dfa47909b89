//! Gateway service placing the HMAC gate in front of the echo downstream.
//!
//! Health-check endpoints (`/_health`, `/health`) are intercepted before the
//! gate so orchestration probes need no credentials.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use http_body_util::Either;
use hyper::service::Service;

use hmacgate_http::{GateResponseBody, HmacAuthService};

use crate::echo::EchoService;

/// Body of responses coming back through the gate.
pub type GatedBody = Either<GateResponseBody, GateResponseBody>;

/// Unified response body: health responses on the left, gated ones on the right.
pub type GatewayBody = Either<GateResponseBody, GatedBody>;

/// Routes health checks directly and everything else through the gate.
#[derive(Debug, Clone)]
pub struct GatewayService {
    gated: HmacAuthService<EchoService>,
}

impl GatewayService {
    /// Create a new gateway around the gated downstream.
    #[must_use]
    pub fn new(gated: HmacAuthService<EchoService>) -> Self {
        Self { gated }
    }
}

impl<B> Service<http::Request<B>> for GatewayService
where
    B: Send + 'static,
{
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            return Box::pin(async { Ok(health_check_response()) });
        }

        let gated = self.gated.clone();
        Box::pin(async move {
            let resp = gated.call(req).await;
            Ok(resp.unwrap_or_else(|e| match e {}).map(Either::Right))
        })
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

fn health_check_response() -> http::Response<GatewayBody> {
    hmacgate_http::json_response(
        http::StatusCode::OK,
        &serde_json::json!({ "status": "running" }),
    )
    .map(Either::Left)
}
