//! Outbound HTTP client the event executor uses to fire a `ScheduleEvent`'s
//! addressable.
//!
//! Faithfully reproduces a quirk of the system this service mirrors: when
//! `parameters` is non-empty the request declares `Content-Length` for it,
//! but the body is never actually attached. Downstream services built
//! against that behavior must keep seeing it.

use std::time::Duration;

use reqwest::Client;

use crate::domain::errors::{SchedulerError, SchedulerResult};
use crate::domain::models::{Addressable, HttpMethod};

#[derive(Debug, Clone)]
pub struct DispatchClient {
    http: Client,
}

/// Outcome of a single dispatch attempt, for the executor to log.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub status: u16,
    pub body: String,
}

impl DispatchClient {
    pub fn new(timeout: Duration) -> SchedulerResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SchedulerError::DispatchFailed(format!("failed to build http client: {e}")))?;
        Ok(Self { http })
    }

    /// Fires a single addressable. Rejects methods outside the allow-list
    /// with `InvalidMethod` before ever touching the network.
    pub async fn fire(&self, addressable: &Addressable, parameters: &str) -> SchedulerResult<DispatchOutcome> {
        let method = HttpMethod::parse(&addressable.method)
            .ok_or_else(|| SchedulerError::InvalidMethod(addressable.method.clone()))?;

        let mut request = self
            .http
            .request(to_reqwest_method(method), addressable.url())
            .header("Content-Type", "application/json");

        if !parameters.is_empty() {
            request = request.header("Content-Length", parameters.len().to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SchedulerError::DispatchFailed(format!("{}: {e}", addressable.url())))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SchedulerError::DispatchFailed(format!("{}: reading body: {e}", addressable.url())))?;

        Ok(DispatchOutcome { status, body })
    }
}

const fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Trace => reqwest::Method::TRACE,
        HttpMethod::Connect => reqwest::Method::CONNECT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addressable(method: &str, path: &str) -> Addressable {
        Addressable {
            protocol: "http".into(),
            host: "127.0.0.1".into(),
            port: 0,
            path: path.into(),
            method: method.into(),
        }
    }

    #[tokio::test]
    async fn rejects_unknown_method_without_dialing() {
        let client = DispatchClient::new(Duration::from_secs(1)).unwrap();
        let addr = addressable("PATCH", "/x");
        let err = client.fire(&addr, "").await.unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidMethod(_)));
    }

    #[tokio::test]
    async fn fires_get_request_and_reads_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fire")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = DispatchClient::new(Duration::from_secs(1)).unwrap();
        let addr = Addressable {
            protocol: "http".into(),
            host: server.host_with_port().split(':').next().unwrap().to_string(),
            port: server.host_with_port().split(':').nth(1).unwrap().parse().unwrap(),
            path: "/fire".into(),
            method: "GET".into(),
        };
        let outcome = client.fire(&addr, "").await.unwrap();
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.body, "ok");
    }

    #[tokio::test]
    async fn sets_content_length_header_without_sending_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/fire")
            .match_header("content-length", "5")
            .with_status(200)
            .create_async()
            .await;

        let client = DispatchClient::new(Duration::from_secs(1)).unwrap();
        let addr = Addressable {
            protocol: "http".into(),
            host: server.host_with_port().split(':').next().unwrap().to_string(),
            port: server.host_with_port().split(':').nth(1).unwrap().parse().unwrap(),
            path: "/fire".into(),
            method: "POST".into(),
        };
        let outcome = client.fire(&addr, "hello").await.unwrap();
        assert_eq!(outcome.status, 200);
    }
}
