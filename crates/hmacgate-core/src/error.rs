//! Error types for the HmacGate core.

/// Core error type for HmacGate infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum HmacGateError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for HmacGate operations.
pub type HmacGateResult<T> = Result<T, HmacGateError>;
