//! End-to-end tests for HmacGate server.
//!
//! Each test starts its own server in-process on an ephemeral port and talks
//! to it over real TCP with a `reqwest` client.

use std::sync::Once;
use std::time::Duration;

use hmacgate_auth::Credentials;
use hmacgate_core::{AppSecret, GateConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// App ID registered on every test server.
pub const APP_ID: &str = "some-app-id";
/// Secret of [`APP_ID`].
pub const SECRET: &str = "some-app-secret";

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A server running on the current tokio runtime.
#[derive(Debug)]
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Start a server whose nonces expire after `nonce_expiration`.
    pub async fn start(nonce_expiration: Duration) -> anyhow::Result<Self> {
        init_tracing();

        let config = GateConfig {
            listen: "127.0.0.1:0".to_owned(),
            nonce_expiration,
            app_secrets: vec![AppSecret {
                app_id: APP_ID.to_owned(),
                secret: SECRET.to_owned(),
            }],
            ..GateConfig::default()
        };

        let (service, _ledger) = hmacgate_server::build_gateway(&config)?;
        let listener = TcpListener::bind(&config.listen).await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let (shutdown, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(hmacgate_server::serve(listener, service, async move {
            rx.await.ok();
        }));

        Ok(Self {
            base_url,
            shutdown,
            handle,
        })
    }

    /// Full URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(self) -> anyhow::Result<()> {
        self.shutdown.send(()).ok();
        self.handle.await?
    }
}

/// Build a GET request carrying `creds` as headers.
pub fn signed_get(
    client: &reqwest::Client,
    url: &str,
    creds: &Credentials,
) -> anyhow::Result<reqwest::RequestBuilder> {
    let mut headers = reqwest::header::HeaderMap::new();
    creds.apply_to(&mut headers)?;
    Ok(client.get(url).headers(headers))
}

#[cfg(test)]
mod test_gate;
