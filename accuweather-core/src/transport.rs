use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::Result;

/// Raw answer from the HTTP layer, before any status or JSON handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests on behalf of a [`Connection`](crate::Connection).
///
/// Implementations report connection-level failures as
/// [`AccuweatherError::ApiConnection`](crate::AccuweatherError::ApiConnection) and
/// return every HTTP answer, successful or not, as a [`TransportResponse`].
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<TransportResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<TransportResponse> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        debug!(status, body = %truncate_body(&body), "AccuWeather response");

        Ok(TransportResponse { status, body })
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccuweatherError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn passes_query_and_returns_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/locations/v1/cities/ipaddress.json"))
            .and(query_param("apikey", "k"))
            .and(query_param("q", "81.156.190.65"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"Key": "330732"})),
            )
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/locations/v1/cities/ipaddress.json", mock_server.uri());
        let query = [
            ("apikey", "k".to_string()),
            ("q", "81.156.190.65".to_string()),
        ];
        let res = transport.get(&url, &query).await.unwrap();

        assert!(res.is_success());
        assert!(res.body.contains("330732"));
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let res = transport.get(&mock_server.uri(), &[]).await.unwrap();

        assert_eq!(res.status, 403);
        assert!(!res.is_success());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connection_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport.get("http://127.0.0.1:9/", &[]).await.unwrap_err();

        assert!(matches!(err, AccuweatherError::ApiConnection(_)));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);

        assert_eq!(truncate_body("short"), "short");
    }
}
