//! The seam between the engine and wherever location datasets come from.

use std::future::Future;

use crate::domain::{DepartmentCode, LocationDataset};

use super::error::SourceError;

/// Trait for providing per-department location datasets.
///
/// This abstraction allows the engine to be tested with mock data and to
/// put a cache in front of the live provider.
pub trait LocationSource: Send + Sync + 'static {
    /// Fetch the dataset currently published for `area`.
    fn fetch_locations(
        &self,
        area: DepartmentCode,
    ) -> impl Future<Output = Result<LocationDataset, SourceError>> + Send;
}
