//! HTTP client for the area directory.

use tracing::debug;

use crate::domain::{Department, Municipality};

use super::error::DirectoryError;
use super::provider::AreaDirectory;
use super::types::{CommuneDto, DepartmentDto, build_departments, build_municipalities};

/// Default base URL for the directory files.
const DEFAULT_BASE_URL: &str = "https://vitemadose.gitlab.io/vitemadose";

/// Configuration for the directory client.
#[derive(Debug, Clone)]
pub struct DirectoryClientConfig {
    /// Base URL for the directory files
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectoryClientConfig {
    /// Create a config pointing at the public provider.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing or mirrors).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for DirectoryClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory backed by the provider's static JSON files.
#[derive(Debug, Clone)]
pub struct HttpAreaDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAreaDirectory {
    /// Create a new directory client.
    pub fn new(config: DirectoryClientConfig) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, DirectoryError> {
        debug!(%url, "fetching directory file");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| DirectoryError::Json {
                message: e.to_string(),
            })
    }
}

impl AreaDirectory for HttpAreaDirectory {
    async fn find_municipality(
        &self,
        postal_code: &str,
        municipality_code: &str,
    ) -> Result<Option<Municipality>, DirectoryError> {
        let url = format!("{}/communes/{}.json", self.base_url, postal_code.trim());

        let Some(dtos) = self.get_json::<Vec<CommuneDto>>(&url).await? else {
            return Ok(None);
        };

        Ok(build_municipalities(dtos)
            .into_iter()
            .find(|m| m.code == municipality_code && m.postal_code == postal_code))
    }

    async fn list_departments(&self) -> Result<Vec<Department>, DirectoryError> {
        let url = format!("{}/departements.json", self.base_url);

        let dtos = self
            .get_json::<Vec<DepartmentDto>>(&url)
            .await?
            .ok_or_else(|| DirectoryError::Api {
                status: 404,
                message: format!("{url} not found"),
            })?;

        Ok(build_departments(dtos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = DirectoryClientConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_with_base_url() {
        let config = DirectoryClientConfig::new().with_base_url("http://localhost:8080/");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_creation() {
        assert!(HttpAreaDirectory::new(DirectoryClientConfig::new()).is_ok());
    }
}
