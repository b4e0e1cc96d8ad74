//! Location data provider response DTOs.
//!
//! These types map directly to the per-department JSON files the provider
//! publishes (`{code}.json`). Field names are the provider's. They use
//! `Option` and `#[serde(default)]` liberally because the provider omits
//! fields or sends `null` depending on the booking platform.

use serde::{Deserialize, Serialize};

/// One department file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepartmentFile {
    /// Schema version of the file.
    pub version: Option<u32>,

    /// When the provider last rebuilt this file (ISO 8601 datetime).
    pub last_updated: String,

    /// Sites with at least one bookable slot.
    #[serde(default)]
    pub centres_disponibles: Vec<CentreDto>,

    /// Sites without bookable slots.
    #[serde(default)]
    pub centres_indisponibles: Vec<CentreDto>,
}

/// A vaccination site.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CentreDto {
    /// Department code, as published (e.g. "35", "2A", "om").
    pub departement: String,

    /// Site name.
    pub nom: String,

    /// Booking page URL. Empty string when there is none.
    pub url: Option<String>,

    /// Site coordinates.
    pub location: Option<LocationDto>,

    /// Address and contact details.
    pub metadata: Option<MetadataDto>,

    /// Next available appointment (ISO 8601 datetime).
    pub prochain_rdv: Option<String>,

    /// Booking platform name.
    pub plateforme: Option<String>,

    /// Site category (e.g. "vaccination-center", "drugstore").
    #[serde(rename = "type")]
    pub centre_type: Option<String>,

    /// Number of slots currently bookable.
    #[serde(default)]
    pub appointment_count: u32,

    /// Provider-side identifier.
    pub internal_id: Option<String>,

    /// Vaccines offered.
    #[serde(default)]
    pub vaccine_type: Option<Vec<String>>,

    /// Whether bookings are only taken by phone.
    #[serde(default)]
    pub appointment_by_phone_only: bool,

    /// Slot counts per schedule bucket.
    #[serde(default)]
    pub appointment_schedules: Option<Vec<ScheduleDto>>,
}

/// Site coordinates.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationDto {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub cp: Option<String>,
}

/// Site address and contact details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataDto {
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub business_hours: Option<serde_json::Value>,
}

/// Slot count for one schedule bucket.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleDto {
    pub name: String,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_file() {
        let json = r#"{"last_updated": "2021-05-12T10:00:00+02:00"}"#;
        let file: DepartmentFile = serde_json::from_str(json).unwrap();
        assert!(file.centres_disponibles.is_empty());
        assert!(file.centres_indisponibles.is_empty());
    }

    #[test]
    fn parse_full_centre() {
        let json = r#"{
            "departement": "35",
            "nom": "Centre de vaccination Rennes Sud",
            "url": "https://partners.doctolib.fr/centre-rennes-sud",
            "location": {"longitude": -1.68, "latitude": 48.09, "city": "Rennes", "cp": "35200"},
            "metadata": {
                "address": "1 rue de Nantes",
                "phone_number": "+33299000000",
                "business_hours": null
            },
            "prochain_rdv": "2021-05-13T09:20:00+02:00",
            "plateforme": "Doctolib",
            "type": "vaccination-center",
            "appointment_count": 42,
            "internal_id": "doctolib123",
            "vaccine_type": ["Pfizer-BioNTech"],
            "appointment_by_phone_only": false,
            "appointment_schedules": [
                {
                    "name": "chronodose",
                    "from": "2021-05-12T00:00:00+02:00",
                    "to": "2021-05-13T23:59:59+02:00",
                    "total": 7
                },
                {"name": "1_days", "total": 12}
            ]
        }"#;

        let centre: CentreDto = serde_json::from_str(json).unwrap();
        assert_eq!(centre.nom, "Centre de vaccination Rennes Sud");
        assert_eq!(centre.appointment_count, 42);
        assert_eq!(centre.centre_type.as_deref(), Some("vaccination-center"));
        let schedules = centre.appointment_schedules.unwrap();
        assert_eq!(schedules[0].total, 7);
        assert_eq!(schedules[1].from, None);
    }

    #[test]
    fn parse_sparse_centre() {
        let json = r#"{
            "departement": "35",
            "nom": "Pharmacie du Centre",
            "url": "",
            "location": null,
            "prochain_rdv": null,
            "vaccine_type": null,
            "appointment_schedules": null
        }"#;

        let centre: CentreDto = serde_json::from_str(json).unwrap();
        assert_eq!(centre.appointment_count, 0);
        assert!(!centre.appointment_by_phone_only);
        assert!(centre.location.is_none());
        assert!(centre.vaccine_type.is_none());
    }
}
