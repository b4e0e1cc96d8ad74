//! Directory DTOs and their conversion to domain areas.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, Department, DepartmentCode, Municipality};

/// A department as listed in `departements.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepartmentDto {
    pub code_departement: String,
    pub nom_departement: String,
    pub code_region: Option<u32>,
    pub nom_region: Option<String>,
}

/// A municipality as listed in the communes files.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneDto {
    pub code: String,
    pub code_postal: String,
    pub nom: String,
    pub code_departement: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Convert department DTOs, dropping entries with invalid codes.
pub fn build_departments(dtos: Vec<DepartmentDto>) -> Vec<Department> {
    dtos.into_iter()
        .filter_map(|d| {
            DepartmentCode::parse_normalized(&d.code_departement)
                .ok()
                .map(|code| Department {
                    code,
                    name: d.nom_departement,
                })
        })
        .collect()
}

/// Convert commune DTOs, dropping entries with invalid department codes.
pub fn build_municipalities(dtos: Vec<CommuneDto>) -> Vec<Municipality> {
    dtos.into_iter()
        .filter_map(|c| {
            DepartmentCode::parse_normalized(&c.code_departement)
                .ok()
                .map(|department| Municipality {
                    code: c.code,
                    postal_code: c.code_postal,
                    department,
                    name: c.nom,
                    coordinates: Coordinates::new(c.latitude, c.longitude),
                })
        })
        .collect()
}
