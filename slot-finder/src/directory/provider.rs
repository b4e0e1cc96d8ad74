//! The seam between the engine and the area reference data.

use std::future::Future;

use crate::domain::{Department, Municipality};

use super::error::DirectoryError;

/// Lookup of departments and municipalities by code.
pub trait AreaDirectory: Send + Sync + 'static {
    /// Find a municipality by postal code and municipality code.
    ///
    /// Returns `Ok(None)` when no such municipality exists.
    fn find_municipality(
        &self,
        postal_code: &str,
        municipality_code: &str,
    ) -> impl Future<Output = Result<Option<Municipality>, DirectoryError>> + Send;

    /// List every department. Callers may cache the result.
    fn list_departments(
        &self,
    ) -> impl Future<Output = Result<Vec<Department>, DirectoryError>> + Send;
}
