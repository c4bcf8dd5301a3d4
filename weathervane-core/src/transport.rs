//! The network seam.
//!
//! The orchestrator only ever talks to the outside world through the
//! [`Transport`] trait, so tests substitute a scripted double and never
//! touch the network. [`HttpTransport`] is the real implementation.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Failure modes of a single fetch. No retrying happens at this layer;
/// retry policy belongs to whoever drives the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("could not reach the server: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("server responded with HTTP status {0}")]
    HttpStatus(u16),

    #[error("transport failure: {0}")]
    Unknown(String),
}

/// Performs one HTTP request and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>, TransportError>;
}

/// `reqwest`-backed transport. The timeout is enforced per request here,
/// not by the caller.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let res = self
            .http
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(classify_reqwest_error)?;

        if !status.is_success() {
            tracing::debug!(
                status = status.as_u16(),
                body = %truncate_body(&body),
                "request rejected by server"
            );
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        Ok(body.to_vec())
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Unreachable(err.to_string())
    } else {
        TransportError::Unknown(err.to_string())
    }
}

fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    if text.len() > MAX {
        format!("{}...", &text[..MAX])
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url_of(server: &MockServer) -> Url {
        Url::parse(&format!("{}/data", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn successful_response_returns_body_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
            .mount(&server)
            .await;

        let transport = HttpTransport::new();
        let body = transport
            .fetch(&url_of(&server), Duration::from_secs(5))
            .await
            .expect("fetch should succeed");

        assert_eq!(body, b"payload");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("city not found"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new();
        let err = transport
            .fetch(&url_of(&server), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::HttpStatus(404));
    }

    #[tokio::test]
    async fn server_error_status_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = HttpTransport::new();
        let err = transport
            .fetch(&url_of(&server), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::HttpStatus(500));
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new();
        let err = transport
            .fetch(&url_of(&server), Duration::from_millis(50))
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::Timeout);
    }

    #[tokio::test]
    async fn closed_port_maps_to_unreachable() {
        // Bind a server to get a free port, then shut it down so the
        // connection is refused.
        let server = MockServer::start().await;
        let url = url_of(&server);
        drop(server);

        let transport = HttpTransport::new();
        let err = transport.fetch(&url, Duration::from_secs(5)).await.unwrap_err();

        assert!(matches!(err, TransportError::Unreachable(_)));
    }
}
