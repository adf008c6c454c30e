//! HTTP-backed [`MetricSource`] for one metric.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::http::HttpClient;
use super::payload::{parsers, Parser};
use crate::domain::{MetricKind, SourceTier};
use crate::error::FetchError;
use crate::port::outbound::{Admission, MetricSource};

/// One provider endpoint and how to read its payload.
struct Endpoint {
    url: Url,
    host: String,
    parse: Parser,
}

impl Endpoint {
    fn new(url: Url, parse: Parser) -> Self {
        let host = url.host_str().unwrap_or("unknown").to_string();
        Self { url, host, parse }
    }
}

/// Primary and backup providers of a single metric.
pub struct HttpMetricSource {
    kind: MetricKind,
    primary: Endpoint,
    backup: Endpoint,
    http: Arc<HttpClient>,
}

impl HttpMetricSource {
    #[must_use]
    pub fn new(kind: MetricKind, primary: Url, backup: Url, http: Arc<HttpClient>) -> Self {
        let (primary_parser, backup_parser) = parsers(kind);
        Self {
            kind,
            primary: Endpoint::new(primary, primary_parser),
            backup: Endpoint::new(backup, backup_parser),
            http,
        }
    }

    #[must_use]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    fn endpoint(&self, tier: SourceTier) -> &Endpoint {
        match tier {
            SourceTier::Primary => &self.primary,
            SourceTier::Backup | SourceTier::Failed => &self.backup,
        }
    }

    async fn call(&self, endpoint: &Endpoint) -> Result<f64, FetchError> {
        let body = self.http.get_json(&endpoint.url).await?;
        (endpoint.parse)(&body)
    }
}

/// Build the adapter for `kind` behind the source port.
#[must_use]
pub fn build_source(
    kind: MetricKind,
    primary: Url,
    backup: Url,
    http: Arc<HttpClient>,
) -> Arc<dyn MetricSource> {
    Arc::new(HttpMetricSource::new(kind, primary, backup, http))
}

#[async_trait]
impl MetricSource for HttpMetricSource {
    fn providers(&self) -> (&str, &str) {
        (&self.primary.host, &self.backup.host)
    }

    async fn admit(&self, tier: SourceTier) -> Result<Admission, FetchError> {
        let permit = self.http.admit(&self.endpoint(tier).url).await?;
        Ok(Admission::holding(permit))
    }

    async fn fetch_primary(&self) -> Result<f64, FetchError> {
        self.call(&self.primary).await
    }

    async fn fetch_backup(&self) -> Result<f64, FetchError> {
        self.call(&self.backup).await
    }
}
