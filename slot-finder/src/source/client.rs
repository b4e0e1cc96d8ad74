//! HTTP client for the location data provider.
//!
//! The provider publishes one static JSON file per department. Files are
//! rebuilt every few minutes; `last_updated` inside each file is the
//! freshness marker the staleness poller watches.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{DepartmentCode, LocationDataset};

use super::convert::convert_department_file;
use super::error::SourceError;
use super::provider::LocationSource;
use super::types::DepartmentFile;

/// Default base URL for the provider's department files.
const DEFAULT_BASE_URL: &str = "https://vitemadose.gitlab.io/vitemadose";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Configuration for the HTTP location source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL under which `{code}.json` files live
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl HttpSourceConfig {
    /// Create a config pointing at the public provider.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing or mirrors).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Location source backed by the provider's HTTP endpoint.
///
/// Uses a semaphore to limit concurrent requests: a municipality search
/// fetches the home department and all its neighbours at once.
#[derive(Debug, Clone)]
pub struct HttpLocationSource {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpLocationSource {
    /// Create a new client with the given configuration.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    fn url_for(&self, area: DepartmentCode) -> String {
        format!("{}/{}.json", self.base_url, area.as_str().to_lowercase())
    }
}

impl LocationSource for HttpLocationSource {
    async fn fetch_locations(&self, area: DepartmentCode) -> Result<LocationDataset, SourceError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SourceError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = self.url_for(area);
        debug!(%url, "fetching department dataset");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(area));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let file: DepartmentFile = serde_json::from_str(&body).map_err(|e| SourceError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        convert_department_file(&file, area).map_err(|e| SourceError::Conversion {
            area,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = HttpSourceConfig::new()
            .with_base_url("http://localhost:8080/")
            .with_max_concurrent(2)
            .with_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = HttpSourceConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn url_uses_lowercase_code() {
        let client = HttpLocationSource::new(HttpSourceConfig::new()).unwrap();

        let om = DepartmentCode::parse("OM").unwrap();
        assert_eq!(
            client.url_for(om),
            "https://vitemadose.gitlab.io/vitemadose/om.json"
        );

        let corse = DepartmentCode::parse("2A").unwrap();
        assert_eq!(
            client.url_for(corse),
            "https://vitemadose.gitlab.io/vitemadose/2a.json"
        );
    }
}
