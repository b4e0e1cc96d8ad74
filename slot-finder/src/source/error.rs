//! Location source error types.

use crate::domain::DepartmentCode;

/// Errors from fetching a department's location dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Provider returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// No dataset is published for this department
    #[error("no dataset for department {0}")]
    NotFound(DepartmentCode),

    /// Rate limited by the provider
    #[error("rate limited by location provider")]
    RateLimited,

    /// Payload parsed but could not be converted to domain types
    #[error("invalid dataset for department {area}: {message}")]
    Conversion { area: DepartmentCode, message: String },

    /// Mock data directory could not be loaded
    #[error("mock data error: {0}")]
    MockData(String),
}
