//! Gate behaviour over real HTTP.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hmacgate_auth::Credentials;
    use reqwest::StatusCode;

    use crate::{APP_ID, SECRET, TestServer, signed_get};

    const EXPIRATION: Duration = Duration::from_secs(60);

    async fn assert_unauthorized(resp: reqwest::Response) {
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(content_type.starts_with("application/json"), "{content_type}");

        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json, serde_json::json!({ "msg": "invalid authorization" }));
    }

    #[tokio::test]
    async fn test_should_serve_health_without_credentials() {
        let server = TestServer::start(EXPIRATION).await.unwrap();
        let client = reqwest::Client::new();

        for path in ["/health", "/_health"] {
            let resp = client.get(server.url(path)).send().await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let json: serde_json::Value = resp.json().await.unwrap();
            assert_eq!(json["status"], "running");
        }

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_should_admit_signed_request() {
        let server = TestServer::start(EXPIRATION).await.unwrap();
        let client = reqwest::Client::new();
        let creds = Credentials::sign(APP_ID, SECRET.as_bytes());

        let resp = signed_get(&client, &server.url("/orders/7"), &creds)
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["msg"], "authorized");
        assert_eq!(json["data"]["method"], "GET");
        assert_eq!(json["data"]["path"], "/orders/7");

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_should_reject_unsigned_request() {
        let server = TestServer::start(EXPIRATION).await.unwrap();
        let client = reqwest::Client::new();

        let resp = client.get(server.url("/orders")).send().await.unwrap();
        assert_unauthorized(resp).await;

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_should_reject_replay() {
        let server = TestServer::start(EXPIRATION).await.unwrap();
        let client = reqwest::Client::new();
        let creds = Credentials::sign(APP_ID, SECRET.as_bytes());
        let url = server.url("/orders");

        let first = signed_get(&client, &url, &creds)
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = signed_get(&client, &url, &creds)
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_unauthorized(second).await;

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_should_reject_wrong_secret_and_unknown_app() {
        let server = TestServer::start(EXPIRATION).await.unwrap();
        let client = reqwest::Client::new();
        let url = server.url("/orders");

        let wrong_secret = Credentials::sign(APP_ID, b"not-the-secret");
        let resp = signed_get(&client, &url, &wrong_secret)
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_unauthorized(resp).await;

        let unknown_app = Credentials::sign("intruder", SECRET.as_bytes());
        let resp = signed_get(&client, &url, &unknown_app)
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_unauthorized(resp).await;

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_should_reject_stale_timestamp() {
        let server = TestServer::start(Duration::from_secs(5)).await.unwrap();
        let client = reqwest::Client::new();
        let stale = chrono::Utc::now().timestamp() - 30;
        let creds = Credentials::sign_with(APP_ID, SECRET.as_bytes(), "stale-nonce", stale);

        let resp = signed_get(&client, &server.url("/"), &creds)
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_unauthorized(resp).await;

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_should_accept_nonce_again_after_expiration() {
        let server = TestServer::start(Duration::from_secs(1)).await.unwrap();
        let client = reqwest::Client::new();
        let url = server.url("/");
        let nonce = "reused-nonce";

        let first = Credentials::sign_with(
            APP_ID,
            SECRET.as_bytes(),
            nonce,
            chrono::Utc::now().timestamp(),
        );
        let resp = signed_get(&client, &url, &first)
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        let again = Credentials::sign_with(
            APP_ID,
            SECRET.as_bytes(),
            nonce,
            chrono::Utc::now().timestamp(),
        );
        let resp = signed_get(&client, &url, &again)
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        server.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_admit_concurrent_replays_once() {
        let server = TestServer::start(EXPIRATION).await.unwrap();
        let client = reqwest::Client::new();
        let creds = Credentials::sign(APP_ID, SECRET.as_bytes());
        let url = server.url("/orders");

        let requests = (0..16).map(|_| {
            let request = signed_get(&client, &url, &creds).unwrap();
            async move { request.send().await.unwrap().status() }
        });
        let statuses = futures::future::join_all(requests).await;

        let admitted = statuses.iter().filter(|s| **s == StatusCode::OK).count();
        assert_eq!(admitted, 1);
        assert!(
            statuses
                .iter()
                .all(|s| *s == StatusCode::OK || *s == StatusCode::UNAUTHORIZED)
        );

        server.stop().await.unwrap();
    }
}
