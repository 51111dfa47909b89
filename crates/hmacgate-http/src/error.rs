//! Application error kinds and the HTTP-facing error type.
//!
//! A [`GateError`] pairs an [`ErrorKind`], which selects the status code, with
//! the message shown to the client. Internal causes travel in `source` and are
//! only ever logged.

use std::fmt;

/// Classification of an application error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Unclassified error.
    #[default]
    Other,
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Forbidden (403).
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Conflict (409).
    Conflict,
    /// Gone (410).
    Gone,
    /// Unprocessable request data (422).
    Unprocessable,
    /// Internal server error (500).
    Internal,
    /// Bad gateway (502).
    BadGateway,
}

impl ErrorKind {
    /// Returns the short description of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Other => "other error",
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Gone => "gone",
            Self::Unprocessable => "unprocessable",
            Self::Internal => "internal error",
            Self::BadGateway => "bad gateway",
        }
    }

    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::BadRequest => http::StatusCode::BAD_REQUEST,
            Self::Unauthorized => http::StatusCode::UNAUTHORIZED,
            Self::Forbidden => http::StatusCode::FORBIDDEN,
            Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::Conflict => http::StatusCode::CONFLICT,
            Self::Gone => http::StatusCode::GONE,
            Self::Unprocessable => http::StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadGateway => http::StatusCode::BAD_GATEWAY,
            Self::Other | Self::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error that is rendered as an HTTP response.
#[derive(Debug)]
pub struct GateError {
    /// The error kind.
    pub kind: ErrorKind,
    /// The message returned to the client.
    pub message: String,
    /// The underlying cause, if any. Never sent to the client.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for GateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl GateError {
    /// Create a new `GateError` whose message is the kind's description.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self::with_message(kind, kind.as_str())
    }

    /// Create a new `GateError` with a custom message.
    #[must_use]
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        self.kind.status_code()
    }

    /// The uniform rejection of an unauthenticated request.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::with_message(ErrorKind::Unauthorized, "invalid authorization")
    }

    /// Internal server error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Internal, message)
    }

    /// Render the error and its source chain on a single line.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            rendered.push_str(": ");
            rendered.push_str(&err.to_string());
            current = err.source();
        }
        rendered
    }
}
