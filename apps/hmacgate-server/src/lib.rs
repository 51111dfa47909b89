//! HmacGate server components.
//!
//! The binary in `main.rs` wires these together; they are exposed as a
//! library so tests can run the full server in-process.

pub mod echo;
pub mod gateway;
pub mod server;

pub use gateway::{GatewayBody, GatewayService};
pub use server::{build_gateway, build_registry, run_health_check, serve};
