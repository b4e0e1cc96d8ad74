//! Caching layer for provider responses.
//!
//! The provider rebuilds its department files every few minutes, so a short
//! TTL on location datasets spares repeated fetches when a municipality
//! search pulls in several neighbouring departments. The TTL stays below the
//! staleness poll interval so each poll tick observes a fresh build.
//!
//! Directory lookups change rarely and get a much longer TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::directory::{AreaDirectory, DirectoryError};
use crate::domain::{Department, DepartmentCode, LocationDataset, Municipality};
use crate::source::{LocationSource, SourceError};

/// Configuration for the caches.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for location datasets.
    pub dataset_ttl: Duration,

    /// TTL for directory lookups.
    pub directory_ttl: Duration,

    /// Maximum number of cached entries per cache.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dataset_ttl: Duration::from_secs(30),
            directory_ttl: Duration::from_secs(3600),
            max_capacity: 1000,
        }
    }
}

/// Location source with caching.
///
/// Wraps any `LocationSource` and caches successful responses per
/// department. Errors are never cached.
pub struct CachedLocationSource<S> {
    source: S,
    datasets: MokaCache<DepartmentCode, Arc<LocationDataset>>,
}

impl<S: LocationSource> CachedLocationSource<S> {
    /// Create a new cached source.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let datasets = MokaCache::builder()
            .time_to_live(config.dataset_ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { source, datasets }
    }

    /// Access the underlying source for operations that bypass cache.
    pub fn inner(&self) -> &S {
        &self.source
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.datasets.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.datasets.invalidate_all();
    }
}

impl<S: LocationSource> LocationSource for CachedLocationSource<S> {
    async fn fetch_locations(&self, area: DepartmentCode) -> Result<LocationDataset, SourceError> {
        if let Some(cached) = self.datasets.get(&area).await {
            debug!(%area, "dataset cache hit");
            return Ok((*cached).clone());
        }

        let dataset = self.source.fetch_locations(area).await?;
        self.datasets.insert(area, Arc::new(dataset.clone())).await;

        Ok(dataset)
    }
}

/// Area directory with caching.
///
/// Only found municipalities are cached; a miss is asked again next time.
pub struct CachedAreaDirectory<D> {
    directory: D,
    departments: MokaCache<(), Arc<Vec<Department>>>,
    municipalities: MokaCache<(String, String), Municipality>,
}

impl<D: AreaDirectory> CachedAreaDirectory<D> {
    /// Create a new cached directory.
    pub fn new(directory: D, config: &CacheConfig) -> Self {
        let departments = MokaCache::builder()
            .time_to_live(config.directory_ttl)
            .max_capacity(1)
            .build();
        let municipalities = MokaCache::builder()
            .time_to_live(config.directory_ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            directory,
            departments,
            municipalities,
        }
    }

    /// Access the underlying directory.
    pub fn inner(&self) -> &D {
        &self.directory
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.departments.invalidate_all();
        self.municipalities.invalidate_all();
    }
}

impl<D: AreaDirectory> AreaDirectory for CachedAreaDirectory<D> {
    async fn find_municipality(
        &self,
        postal_code: &str,
        municipality_code: &str,
    ) -> Result<Option<Municipality>, DirectoryError> {
        let key = (postal_code.to_string(), municipality_code.to_string());

        if let Some(cached) = self.municipalities.get(&key).await {
            return Ok(Some(cached));
        }

        let found = self
            .directory
            .find_municipality(postal_code, municipality_code)
            .await?;

        if let Some(municipality) = &found {
            self.municipalities.insert(key, municipality.clone()).await;
        }

        Ok(found)
    }

    async fn list_departments(&self) -> Result<Vec<Department>, DirectoryError> {
        if let Some(cached) = self.departments.get(&()).await {
            return Ok((*cached).clone());
        }

        let departments = self.directory.list_departments().await?;
        self.departments
            .insert((), Arc::new(departments.clone()))
            .await;

        Ok(departments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticAreaDirectory;
    use crate::domain::Coordinates;
    use crate::source::MockLocationSource;
    use chrono::{TimeZone, Utc};

    fn code(s: &str) -> DepartmentCode {
        DepartmentCode::parse(s).unwrap()
    }

    fn source() -> MockLocationSource {
        let t = Utc.with_ymd_and_hms(2021, 5, 12, 10, 0, 0).unwrap();
        MockLocationSource::from_datasets([
            LocationDataset::empty(code("35"), t),
            LocationDataset::empty(code("22"), t),
        ])
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.dataset_ttl, Duration::from_secs(30));
        assert_eq!(config.directory_ttl, Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn second_fetch_served_from_cache() {
        let cached = CachedLocationSource::new(source(), &CacheConfig::default());

        cached.fetch_locations(code("35")).await.unwrap();
        cached.fetch_locations(code("35")).await.unwrap();
        cached.fetch_locations(code("22")).await.unwrap();

        assert_eq!(cached.inner().fetch_log(), vec![code("35"), code("22")]);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cached = CachedLocationSource::new(source(), &CacheConfig::default());

        cached.fetch_locations(code("35")).await.unwrap();
        cached.invalidate_all();
        cached.fetch_locations(code("35")).await.unwrap();

        assert_eq!(cached.inner().fetch_count(), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cached = CachedLocationSource::new(source(), &CacheConfig::default());

        assert!(cached.fetch_locations(code("99")).await.is_err());
        assert!(cached.fetch_locations(code("99")).await.is_err());

        assert_eq!(cached.inner().fetch_count(), 2);
    }

    #[tokio::test]
    async fn published_update_visible_after_invalidate() {
        let cached = CachedLocationSource::new(source(), &CacheConfig::default());
        let later = Utc.with_ymd_and_hms(2021, 5, 12, 10, 5, 0).unwrap();

        cached.fetch_locations(code("35")).await.unwrap();
        cached
            .inner()
            .publish(LocationDataset::empty(code("35"), later))
            .await;

        let stale = cached.fetch_locations(code("35")).await.unwrap();
        assert_ne!(stale.last_updated, later);

        cached.invalidate_all();
        let fresh = cached.fetch_locations(code("35")).await.unwrap();
        assert_eq!(fresh.last_updated, later);
    }

    #[tokio::test]
    async fn directory_caches_found_municipalities() {
        let directory = StaticAreaDirectory::default();
        let cached = CachedAreaDirectory::new(directory.clone(), &CacheConfig::default());

        assert!(cached.find_municipality("35000", "35238").await.unwrap().is_none());

        directory
            .add_municipality(Municipality {
                code: "35238".into(),
                postal_code: "35000".into(),
                department: code("35"),
                name: "Rennes".into(),
                coordinates: Coordinates::new(48.1113, -1.68),
            })
            .await;

        // Misses are not cached, so the new entry is found.
        let found = cached.find_municipality("35000", "35238").await.unwrap();
        assert_eq!(found.map(|m| m.name), Some("Rennes".to_string()));
    }

    #[tokio::test]
    async fn directory_caches_department_list() {
        let directory = StaticAreaDirectory::new(
            vec![Department {
                code: code("35"),
                name: "Ille-et-Vilaine".into(),
            }],
            vec![],
        );
        let cached = CachedAreaDirectory::new(directory, &CacheConfig::default());

        let first = cached.list_departments().await.unwrap();
        let second = cached.list_departments().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }
}
