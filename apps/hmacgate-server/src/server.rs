//! Gate assembly, accept loop and health probe.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use hmacgate_auth::{
    CallerRegistry, HmacValidator, InMemoryNonceLedger, NonceLedger, SharedSecret,
    StaticCallerRegistry,
};
use hmacgate_core::GateConfig;
use hmacgate_http::HmacAuthService;

use crate::echo::EchoService;
use crate::gateway::GatewayService;

/// Build the caller registry from the configured app secrets.
#[must_use]
pub fn build_registry(config: &GateConfig) -> StaticCallerRegistry {
    StaticCallerRegistry::new(config.app_secrets.iter().map(|entry| {
        (
            entry.app_id.clone(),
            SharedSecret::from(entry.secret.as_str()),
        )
    }))
}

/// Assemble the gateway and return it with the ledger it commits nonces to.
pub fn build_gateway(config: &GateConfig) -> Result<(GatewayService, Arc<InMemoryNonceLedger>)> {
    let registry = build_registry(config);
    if registry.is_empty() {
        warn!("no app secrets configured, every gated request will be rejected");
    }
    let registry: Arc<dyn CallerRegistry> = Arc::new(registry);

    let ledger = Arc::new(InMemoryNonceLedger::new());
    let validator = HmacValidator::new(
        registry,
        Arc::clone(&ledger) as Arc<dyn NonceLedger>,
        config.nonce_expiration,
    )
    .context("invalid gate configuration")?;

    let gated = HmacAuthService::new(EchoService, Arc::new(validator));
    Ok((GatewayService::new(gated), ledger))
}

/// Run the accept loop until `shutdown` resolves, then drain open connections.
pub async fn serve(
    listener: TcpListener,
    service: GatewayService,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained");

    Ok(())
}

/// Probe the health endpoint of a running server.
///
/// Succeeds only on a 200 answer reporting `"status":"running"`.
pub async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.starts_with("HTTP/1.1 200") && response.contains(r#""status":"running""#) {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hmacgate_core::AppSecret;

    use super::*;

    fn config() -> GateConfig {
        GateConfig {
            app_secrets: vec![AppSecret {
                app_id: "billing".to_owned(),
                secret: "s3cr3t".to_owned(),
            }],
            ..GateConfig::default()
        }
    }

    #[test]
    fn test_should_build_registry_from_config() {
        let registry = build_registry(&config());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get_secret("billing").unwrap().as_bytes(),
            b"s3cr3t"
        );
    }

    #[test]
    fn test_should_reject_zero_nonce_expiration() {
        let config = GateConfig {
            nonce_expiration: Duration::ZERO,
            ..config()
        };
        assert!(build_gateway(&config).is_err());
    }

    #[tokio::test]
    async fn test_should_pass_health_check_against_running_server() {
        let (service, _ledger) = build_gateway(&config()).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, service, async move {
            rx.await.ok();
        }));

        run_health_check(&addr).await.unwrap();

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_should_fail_health_check_without_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(run_health_check(&addr).await.is_err());
    }
}
