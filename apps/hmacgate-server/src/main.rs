//! HmacGate Server - admits only HMAC-signed service-to-service requests.
//!
//! Every request except the health probes must carry the `X-Auth-App-ID`,
//! `X-Auth-Nonce`, `X-Auth-Timestamp` and `X-Auth-Signature` headers. Admitted
//! requests are answered by an echo handler; all others get a uniform 401.
//!
//! # Usage
//!
//! ```text
//! HMAC_APP_SECRETS=billing=s3cr3t GATE_LISTEN=0.0.0.0:8080 hmacgate-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATE_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `HMAC_APP_SECRETS` | *(empty)* | `app-id=secret` pairs separated by `,` |
//! | `NONCE_EXPIRATION_SECS` | `300` | Timestamp freshness window and nonce TTL |
//! | `NONCE_PURGE_INTERVAL_SECS` | `60` | Period of the expired-nonce purge |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hmacgate_core::{GateConfig, LogFormat};
use hmacgate_server::{build_gateway, run_health_check, serve};

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GateConfig::from_env().context("failed to load configuration")?;

    // Handle --health-check flag for container HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level, config.log_format)?;

    info!(
        listen = %config.listen,
        app_count = config.app_secrets.len(),
        nonce_expiration = ?config.nonce_expiration,
        nonce_purge_interval = ?config.nonce_purge_interval,
        version = VERSION,
        "starting HmacGate Server",
    );

    let (service, ledger) = build_gateway(&config)?;
    let _purge = ledger.spawn_purge_task(config.nonce_purge_interval);

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    serve(listener, service, shutdown).await
}
