//! Governed JSON-over-HTTP client shared by every provider adapter.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::governor::{GovernorPermit, ProviderGovernor};
use crate::application::MAX_ATTEMPT_TIMEOUT;
use crate::error::FetchError;

pub struct HttpClient {
    http: Client,
    governor: Arc<ProviderGovernor>,
    timeout: Duration,
}

impl HttpClient {
    /// Build a client. Requests are also capped by the attempt timeout
    /// upper bound so a call can never outlive its fetch.
    #[must_use]
    pub fn new(user_agent: &str, governor: Arc<ProviderGovernor>) -> Self {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(MAX_ATTEMPT_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                Client::new()
            });
        Self {
            http,
            governor,
            timeout: MAX_ATTEMPT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn governor(&self) -> &Arc<ProviderGovernor> {
        &self.governor
    }

    /// Wait until the governor lets a request to `url` out.
    pub async fn admit(&self, url: &Url) -> Result<GovernorPermit, FetchError> {
        self.governor.acquire(url.host_str().unwrap_or("unknown")).await
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Callers hold a permit from [`HttpClient::admit`] for the duration of
    /// the call.
    pub async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        let host = url.host_str().unwrap_or("unknown");

        debug!(host, path = url.path(), "Provider request");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(FetchError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(FetchError::Network(format!("HTTP {status} from {host}")));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    elapsed: self.timeout,
                }
            } else {
                FetchError::Parse(e.to_string())
            }
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                elapsed: self.timeout,
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(
            "regimewatch-test",
            Arc::new(ProviderGovernor::new(4, Duration::ZERO)),
        )
    }

    #[tokio::test]
    async fn decodes_json_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fng/");
                then.status(200).json_body(json!({"data": [{"value": "23"}]}));
            })
            .await;

        let url = Url::parse(&server.url("/fng/")).unwrap();
        let body = client().get_json(&url).await.unwrap();
        assert_eq!(body["data"][0]["value"], "23");
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/oi");
                then.status(429).header("Retry-After", "30");
            })
            .await;

        let url = Url::parse(&server.url("/oi")).unwrap();
        let err = client().get_json(&url).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::RateLimited {
                retry_after: Some(Duration::from_secs(30))
            }
        );
    }

    #[tokio::test]
    async fn admission_takes_a_connection_slot() {
        let client = client();
        let url = Url::parse("https://api.alternative.me/fng/").unwrap();

        let permit = client.admit(&url).await.unwrap();
        assert_eq!(client.governor().available(), 3);
        drop(permit);
        assert_eq!(client.governor().available(), 4);
    }

    #[tokio::test]
    async fn server_error_is_network() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/down");
                then.status(503);
            })
            .await;

        let url = Url::parse(&server.url("/down")).unwrap();
        assert!(matches!(
            client().get_json(&url).await,
            Err(FetchError::Network(_))
        ));
    }

    #[tokio::test]
    async fn html_body_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/html");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let url = Url::parse(&server.url("/html")).unwrap();
        assert!(matches!(
            client().get_json(&url).await,
            Err(FetchError::Parse(_))
        ));
    }
}
