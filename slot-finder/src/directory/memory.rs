//! In-memory area directory.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Department, Municipality};

use super::error::DirectoryError;
use super::provider::AreaDirectory;
use super::types::{CommuneDto, DepartmentDto, build_departments, build_municipalities};

#[derive(Debug, Default)]
struct Areas {
    departments: Vec<Department>,
    municipalities: Vec<Municipality>,
}

/// Directory serving a fixed set of areas.
///
/// Used in mock mode and tests. Contents can be replaced at runtime.
#[derive(Debug, Clone, Default)]
pub struct StaticAreaDirectory {
    inner: Arc<RwLock<Areas>>,
}

impl StaticAreaDirectory {
    /// Create a directory from the given areas.
    pub fn new(departments: Vec<Department>, municipalities: Vec<Municipality>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Areas {
                departments,
                municipalities,
            })),
        }
    }

    /// Load `departements.json` and `communes.json` from a directory.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let data_dir = data_dir.as_ref();

        let departments: Vec<DepartmentDto> = read_json(&data_dir.join("departements.json"))?;
        let communes: Vec<CommuneDto> = read_json(&data_dir.join("communes.json"))?;

        Ok(Self::new(
            build_departments(departments),
            build_municipalities(communes),
        ))
    }

    /// Add a municipality.
    pub async fn add_municipality(&self, municipality: Municipality) {
        self.inner.write().await.municipalities.push(municipality);
    }

    /// Number of municipalities known.
    pub async fn municipality_count(&self) -> usize {
        self.inner.read().await.municipalities.len()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DirectoryError> {
    let json = std::fs::read_to_string(path).map_err(|e| DirectoryError::Data {
        message: format!("failed to read {}: {}", path.display(), e),
    })?;

    serde_json::from_str(&json).map_err(|e| DirectoryError::Data {
        message: format!("failed to parse {}: {}", path.display(), e),
    })
}

impl AreaDirectory for StaticAreaDirectory {
    async fn find_municipality(
        &self,
        postal_code: &str,
        municipality_code: &str,
    ) -> Result<Option<Municipality>, DirectoryError> {
        let areas = self.inner.read().await;
        Ok(areas
            .municipalities
            .iter()
            .find(|m| m.postal_code == postal_code && m.code == municipality_code)
            .cloned())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, DirectoryError> {
        Ok(self.inner.read().await.departments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, DepartmentCode};

    fn rennes() -> Municipality {
        Municipality {
            code: "35238".into(),
            postal_code: "35000".into(),
            department: DepartmentCode::parse("35").unwrap(),
            name: "Rennes".into(),
            coordinates: Coordinates::new(48.1113, -1.68),
        }
    }

    #[tokio::test]
    async fn find_requires_both_codes_to_match() {
        let directory = StaticAreaDirectory::new(vec![], vec![rennes()]);

        assert!(directory.find_municipality("35000", "35238").await.unwrap().is_some());
        assert!(directory.find_municipality("35200", "35238").await.unwrap().is_none());
        assert!(directory.find_municipality("35000", "35047").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_municipality_is_visible() {
        let directory = StaticAreaDirectory::default();
        assert_eq!(directory.municipality_count().await, 0);

        directory.add_municipality(rennes()).await;

        assert_eq!(directory.municipality_count().await, 1);
        assert!(directory.find_municipality("35000", "35238").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn load_fixture_directory() {
        let directory = StaticAreaDirectory::from_dir("data/mock").unwrap();

        let departments = directory.list_departments().await.unwrap();
        assert!(departments.iter().any(|d| d.code.as_str() == "35"));

        let rennes = directory.find_municipality("35000", "35238").await.unwrap();
        assert_eq!(rennes.map(|m| m.name), Some("Rennes".to_string()));
    }

    #[test]
    fn missing_files_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            StaticAreaDirectory::from_dir(dir.path()),
            Err(DirectoryError::Data { .. })
        ));
    }
}
