//! Configuration and shared error types for HmacGate.
//!
//! All configuration is read from environment variables at startup and is
//! immutable afterwards.

mod config;
mod error;

pub use config::{AppSecret, GateConfig, LogFormat, parse_app_secrets};
pub use error::{HmacGateError, HmacGateResult};
