//! HMAC authentication middleware implementing the hyper `Service` trait.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http_body_util::Either;
use tracing::{Instrument, debug, error, info_span};

use hmacgate_auth::{Credentials, HmacValidator};

use crate::error::GateError;
use crate::response::{GateResponseBody, error_to_response, set_request_id};

/// Hyper `Service` that admits only HMAC-signed requests.
///
/// Validated requests are forwarded unmodified to the wrapped service. Every
/// rejection gets the same 401 response; the reason is logged, not returned.
#[derive(Debug)]
pub struct HmacAuthService<S> {
    inner: Arc<S>,
    validator: Arc<HmacValidator>,
}

impl<S> HmacAuthService<S> {
    /// Wrap `inner` behind the gate.
    pub fn new(inner: S, validator: Arc<HmacValidator>) -> Self {
        Self {
            inner: Arc::new(inner),
            validator,
        }
    }
}

impl<S> Clone for HmacAuthService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            validator: Arc::clone(&self.validator),
        }
    }
}

impl<S, B, ResBody> hyper::service::Service<http::Request<B>> for HmacAuthService<S>
where
    S: hyper::service::Service<http::Request<B>, Response = http::Response<ResBody>>
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = http::Response<Either<ResBody, GateResponseBody>>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        let validator = Arc::clone(&self.validator);
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!(
            "hmac_auth",
            request_id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        Box::pin(
            async move {
                let creds = Credentials::from_headers(req.headers());
                match validator.validate(&creds).await {
                    Ok(app) => {
                        debug!(app_id = %app.app_id, "request authorized");
                        let response = inner.call(req).await?;
                        Ok(response.map(Either::Left))
                    }
                    Err(reason) => {
                        let err = GateError::unauthorized().with_source(reason);
                        error!(app_id = %creds.app_id, reason = %err.chain(), "request rejected");
                        let mut response = error_to_response(&err);
                        set_request_id(&mut response, &request_id);
                        Ok(response.map(Either::Right))
                    }
                }
            }
            .instrument(span),
        )
    }
}
