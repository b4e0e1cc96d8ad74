//! Vaccination sites and the per-area datasets that list them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::area::{Coordinates, DepartmentCode};
use super::search::FAST_SLOT_SCHEDULE;

/// Appointments a location offers in one schedule bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSchedule {
    pub name: String,
    pub total: u32,
}

/// What makes two locations "the same site".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationIdentity {
    pub department: DepartmentCode,
    pub name: String,
    pub platform: String,
}

/// A vaccination site as published by the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentLocation {
    pub name: String,
    /// Booking platform (e.g. "Doctolib", "Maiia").
    pub platform: String,
    pub department: DepartmentCode,
    pub internal_id: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Booking page; absent when the site takes no online bookings.
    pub url: Option<String>,
    pub appointment_count: u32,
    pub next_appointment: Option<DateTime<Utc>>,
    pub appointment_by_phone_only: bool,
    pub phone_number: Option<String>,
    pub schedules: Vec<AppointmentSchedule>,
    pub vaccine_types: Vec<String>,
}

impl AppointmentLocation {
    pub fn identity(&self) -> LocationIdentity {
        LocationIdentity {
            department: self.department,
            name: self.name.clone(),
            platform: self.platform.clone(),
        }
    }

    /// Phone-only site with a number the user can actually call.
    pub fn is_reachable_by_phone(&self) -> bool {
        self.appointment_by_phone_only && self.phone_number.is_some()
    }

    /// Total of the named schedule bucket, if the site publishes one.
    pub fn schedule_total(&self, name: &str) -> Option<u32> {
        self.schedules
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.total)
    }

    /// Appointments available at short notice (0 when no bucket is published).
    pub fn fast_slot_count(&self) -> u32 {
        self.schedule_total(FAST_SLOT_SCHEDULE).unwrap_or(0)
    }
}

/// Locations published for one or more departments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDataset {
    pub area_codes: Vec<DepartmentCode>,
    /// Freshness marker: when the provider last rebuilt this dataset.
    pub last_updated: DateTime<Utc>,
    pub available: Vec<AppointmentLocation>,
    pub unavailable: Vec<AppointmentLocation>,
}

impl LocationDataset {
    /// An empty dataset for a single area.
    pub fn empty(area: DepartmentCode, last_updated: DateTime<Utc>) -> Self {
        Self {
            area_codes: vec![area],
            last_updated,
            available: Vec::new(),
            unavailable: Vec::new(),
        }
    }

    /// Number of locations across both lists.
    pub fn len(&self) -> usize {
        self.available.len() + self.unavailable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty() && self.unavailable.is_empty()
    }
}
