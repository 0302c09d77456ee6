//! HTTP client for remote listings.

use reqwest::{Client, Response, StatusCode};
use tracing::{trace, warn};

use crate::error::{SourceError, SourceResult};

use super::config::RemoteSourceConfig;

/// Longest body excerpt kept in error messages.
const BODY_EXCERPT: usize = 200;

/// HTTP client bound to one remote deployment.
pub struct RemoteClient {
    client: Client,
    config: RemoteSourceConfig,
}

impl RemoteClient {
    /// Creates a client with the configured timeout and user agent.
    pub fn new(config: RemoteSourceConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                SourceError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Performs a GET on the listing endpoint and returns the body.
    pub async fn get_events(&self, params: &[(&str, String)]) -> SourceResult<Vec<u8>> {
        let url = self
            .config
            .endpoint()
            .map_err(|e| SourceError::configuration(format!("Invalid events path: {}", e)))?;

        trace!(url = %url, params = params.len(), "Sending request");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(request_error)?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> SourceResult<Vec<u8>> {
        let status = response.status();
        trace!(status = %status, "Received response");

        match status {
            s if s.is_success() => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(request_error),
            StatusCode::NOT_FOUND => Err(SourceError::not_found("Events endpoint not found")),
            s if s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                Err(SourceError::server(format!(
                    "Server error ({}): {}",
                    s,
                    excerpt(&body)
                )))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %s, body = %excerpt(&body), "Unexpected response status");
                Err(SourceError::invalid_response(format!(
                    "Unexpected status {}: {}",
                    s,
                    excerpt(&body)
                )))
            }
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RemoteSourceConfig {
        &self.config
    }
}

fn request_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::timeout(format!("Request timed out: {}", e)).with_source(e)
    } else {
        SourceError::network(format!("Request failed: {}", e)).with_source(e)
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceErrorCode;
    use std::time::Duration;

    fn config(url: &str) -> RemoteSourceConfig {
        RemoteSourceConfig::new("north", url)
            .unwrap()
            .with_events_path("events")
    }

    #[test]
    fn client_creation() {
        let client = RemoteClient::new(config("https://north.example.org/"));
        assert!(client.is_ok());
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        assert_eq!(excerpt(&long).chars().count(), BODY_EXCERPT);
        assert_eq!(excerpt("short"), "short");
    }

    #[tokio::test]
    async fn returns_body_and_sends_params() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/events")
            .match_query(mockito::Matcher::UrlEncoded(
                "per_page".to_string(),
                "100".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let client = RemoteClient::new(config(&server.url())).unwrap();
        let body = client
            .get_events(&[("per_page", "100".to_string())])
            .await
            .unwrap();
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn maps_status_codes() {
        let mut server = mockito::Server::new_async().await;
        let client = RemoteClient::new(config(&server.url())).unwrap();

        for (status, code) in [
            (404, SourceErrorCode::NotFound),
            (503, SourceErrorCode::ServerError),
            (403, SourceErrorCode::InvalidResponse),
        ] {
            let mock = server
                .mock("GET", "/events")
                .with_status(status)
                .with_body("nope")
                .create_async()
                .await;

            let err = client.get_events(&[]).await.unwrap_err();
            assert_eq!(err.code(), code, "status {status}");
            mock.remove_async().await;
        }
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let client = RemoteClient::new(
            config("http://127.0.0.1:9/").with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let err = client.get_events(&[]).await.unwrap_err();
        assert!(matches!(
            err.code(),
            SourceErrorCode::NetworkError | SourceErrorCode::Timeout
        ));
    }
}
