//! Mock location source for development and testing without network access.
//!
//! Loads department files from a directory of JSON fixtures and serves them
//! as if they were live provider responses. Datasets can be replaced at
//! runtime to simulate the provider publishing a new build.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;

use crate::domain::{DepartmentCode, LocationDataset};

use super::convert::convert_department_file;
use super::error::SourceError;
use super::provider::LocationSource;
use super::types::DepartmentFile;

/// Mock source that serves datasets from memory.
#[derive(Clone, Default)]
pub struct MockLocationSource {
    /// Datasets keyed by department code.
    datasets: Arc<RwLock<HashMap<DepartmentCode, LocationDataset>>>,

    /// Every department fetched so far, in call order.
    fetch_log: Arc<Mutex<Vec<DepartmentCode>>>,
}

impl MockLocationSource {
    /// Create a mock source serving the given datasets.
    ///
    /// Each dataset is keyed by its first area code.
    pub fn from_datasets(datasets: impl IntoIterator<Item = LocationDataset>) -> Self {
        let datasets = datasets
            .into_iter()
            .filter_map(|d| d.area_codes.first().copied().map(|code| (code, d)))
            .collect();

        Self {
            datasets: Arc::new(RwLock::new(datasets)),
            fetch_log: Arc::default(),
        }
    }

    /// Create a mock source by loading JSON files from a directory.
    ///
    /// Expects files named `{code}.json` (e.g., `35.json`, `2A.json`).
    /// Other JSON files in the directory are ignored.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let data_dir = data_dir.as_ref();
        let mut datasets = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            SourceError::MockData(format!("failed to read {}: {}", data_dir.display(), e))
        })?;

        for entry in entries {
            let entry = entry
                .map_err(|e| SourceError::MockData(format!("failed to read entry: {}", e)))?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            // Extract the department code from the filename ("35.json" -> "35")
            let Some(code) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| DepartmentCode::parse_normalized(s).ok())
            else {
                continue;
            };

            let json = std::fs::read_to_string(&path).map_err(|e| {
                SourceError::MockData(format!("failed to read {}: {}", path.display(), e))
            })?;

            let file: DepartmentFile = serde_json::from_str(&json).map_err(|e| {
                SourceError::MockData(format!("failed to parse {}: {}", path.display(), e))
            })?;

            let dataset = convert_department_file(&file, code).map_err(|e| {
                SourceError::MockData(format!("failed to convert {}: {}", path.display(), e))
            })?;

            datasets.insert(code, dataset);
        }

        if datasets.is_empty() {
            return Err(SourceError::MockData(format!(
                "no department files found in {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            datasets: Arc::new(RwLock::new(datasets)),
            fetch_log: Arc::default(),
        })
    }

    /// Replace (or add) the dataset served for its first area code.
    pub async fn publish(&self, dataset: LocationDataset) {
        if let Some(code) = dataset.area_codes.first().copied() {
            self.datasets.write().await.insert(code, dataset);
        }
    }

    /// Stop serving `area`; later fetches fail with `NotFound`.
    pub async fn withdraw(&self, area: DepartmentCode) {
        self.datasets.write().await.remove(&area);
    }

    /// List departments available in the mock data.
    pub async fn available_departments(&self) -> Vec<DepartmentCode> {
        let mut codes: Vec<_> = self.datasets.read().await.keys().copied().collect();
        codes.sort();
        codes
    }

    /// Departments fetched so far, in call order.
    pub fn fetch_log(&self) -> Vec<DepartmentCode> {
        self.fetch_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_log.lock().map(|log| log.len()).unwrap_or(0)
    }
}

impl LocationSource for MockLocationSource {
    async fn fetch_locations(&self, area: DepartmentCode) -> Result<LocationDataset, SourceError> {
        if let Ok(mut log) = self.fetch_log.lock() {
            log.push(area);
        }

        let datasets = self.datasets.read().await;
        datasets
            .get(&area)
            .cloned()
            .ok_or(SourceError::NotFound(area))
    }
}
