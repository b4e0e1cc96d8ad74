//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Department, DomainError, SearchMode, SearchRequest};
use crate::pipeline::{DisplayResult, DisplayableLocation};
use crate::resolver::RawSelectionUpdate;

/// Partial update of the search widget's fields.
///
/// Fields are plain strings so that bad values produce a readable 400
/// rather than a generic deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionRequest {
    /// `municipality` or `department`
    pub area_kind: Option<String>,
    pub department_code: Option<String>,
    pub municipality_code: Option<String>,
    pub postal_code: Option<String>,
    /// `standard` or `chronodose`
    pub mode: Option<String>,
    /// `date` or `distance`
    pub sort: Option<String>,
}

impl SelectionRequest {
    /// Validate the enumerated fields.
    pub fn into_update(self) -> Result<RawSelectionUpdate, DomainError> {
        Ok(RawSelectionUpdate {
            area_kind: self.area_kind.as_deref().map(str::parse).transpose()?,
            department_code: self.department_code,
            municipality_code: self.municipality_code,
            postal_code: self.postal_code,
            mode: self.mode.as_deref().map(str::parse).transpose()?,
            sort: self.sort.as_deref().map(str::parse).transpose()?,
        })
    }
}

/// A location in the results list.
#[derive(Debug, Serialize)]
pub struct LocationResult {
    pub name: String,

    /// Booking platform
    pub platform: String,

    pub department: String,

    pub address: Option<String>,

    /// Booking page
    pub url: Option<String>,

    pub phone_number: Option<String>,

    /// Appointments on offer (fast-slot count in fast-slot mode)
    pub appointment_count: u32,

    pub next_appointment: Option<DateTime<Utc>>,

    pub appointment_by_phone_only: bool,

    pub is_available: bool,

    /// Distance from the searched municipality, rounded to 0.1 km
    pub distance_km: Option<f64>,

    pub vaccine_types: Vec<String>,
}

impl LocationResult {
    pub fn from_displayable(l: &DisplayableLocation) -> Self {
        let site = &l.location;
        Self {
            name: site.name.clone(),
            platform: site.platform.clone(),
            department: site.department.to_string(),
            address: site.address.clone(),
            url: site.url.clone(),
            phone_number: site.phone_number.clone(),
            appointment_count: site.appointment_count,
            next_appointment: site.next_appointment,
            appointment_by_phone_only: site.appointment_by_phone_only,
            is_available: l.is_available,
            distance_km: l.distance_km.map(|d| (d * 10.0).round() / 10.0),
            vaccine_types: site.vaccine_types.clone(),
        }
    }
}

/// Response for the results endpoint.
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    /// e.g. "Rennes (35000)"
    pub label: String,

    pub mode: SearchMode,

    /// The current search differs from the one these results belong to
    pub pending: bool,

    pub area_codes: Vec<String>,

    /// Freshness of the primary area's data
    pub last_updated: DateTime<Utc>,

    /// Locations considered, visible or not
    pub total_locations: usize,

    /// Sum of appointments across all considered locations
    pub total_appointments: u64,

    /// Visible locations, best first
    pub locations: Vec<LocationResult>,
}

impl ResultsResponse {
    /// Describe `result` using the search it was built for.
    pub fn new(result: &DisplayResult, current: Option<&SearchRequest>) -> Self {
        let search = &result.search;
        let mode = search.mode();
        Self {
            label: search.label(),
            mode,
            pending: current != Some(search),
            area_codes: result.area_codes.iter().map(|c| c.to_string()).collect(),
            last_updated: result.last_updated,
            total_locations: result.locations.len(),
            total_appointments: result.total_appointments(),
            locations: result
                .visible(mode)
                .map(LocationResult::from_displayable)
                .collect(),
        }
    }
}

/// Response for the status endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub search_in_progress: bool,
    pub update_available: bool,
    pub last_checked: Option<DateTime<Utc>>,
}

/// A department in the departments listing.
#[derive(Debug, Serialize)]
pub struct DepartmentResult {
    pub code: String,
    pub name: String,
}

impl From<Department> for DepartmentResult {
    fn from(d: Department) -> Self {
        Self {
            code: d.code.to_string(),
            name: d.name,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
