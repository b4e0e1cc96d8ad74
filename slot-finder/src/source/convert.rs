//! Conversion from provider DTOs to domain types.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{
    AppointmentLocation, AppointmentSchedule, Coordinates, DepartmentCode, LocationDataset,
};

use super::types::{CentreDto, DepartmentFile};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a department code
    #[error("invalid department code: {0}")]
    InvalidDepartment(String),

    /// Failed to parse the freshness timestamp
    #[error("invalid last_updated timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Convert a department file to a dataset for `area`.
///
/// Centres that fail conversion are skipped with a warning rather than
/// failing the whole file. An unavailable centre sharing its identity with
/// an available one is dropped, so the two lists stay disjoint.
pub fn convert_department_file(
    file: &DepartmentFile,
    area: DepartmentCode,
) -> Result<LocationDataset, ConversionError> {
    let last_updated = parse_timestamp(&file.last_updated)
        .ok_or_else(|| ConversionError::InvalidTimestamp(file.last_updated.clone()))?;

    let available: Vec<AppointmentLocation> = convert_centres(&file.centres_disponibles, area);
    let available_ids: HashSet<_> = available.iter().map(|l| l.identity()).collect();

    let unavailable = convert_centres(&file.centres_indisponibles, area)
        .into_iter()
        .filter(|l| {
            let duplicate = available_ids.contains(&l.identity());
            if duplicate {
                warn!(
                    area = %area,
                    name = %l.name,
                    platform = %l.platform,
                    "centre listed as both available and unavailable, keeping available"
                );
            }
            !duplicate
        })
        .collect();

    Ok(LocationDataset {
        area_codes: vec![area],
        last_updated,
        available,
        unavailable,
    })
}

fn convert_centres(centres: &[CentreDto], area: DepartmentCode) -> Vec<AppointmentLocation> {
    centres
        .iter()
        .filter_map(|centre| match convert_centre(centre) {
            Ok(location) => Some(location),
            Err(e) => {
                warn!(area = %area, centre = %centre.nom, error = %e, "skipping centre");
                None
            }
        })
        .collect()
}

/// Convert a single centre.
pub fn convert_centre(centre: &CentreDto) -> Result<AppointmentLocation, ConversionError> {
    let department = DepartmentCode::parse_normalized(&centre.departement)
        .map_err(|_| ConversionError::InvalidDepartment(centre.departement.clone()))?;

    let metadata = centre.metadata.as_ref();

    Ok(AppointmentLocation {
        name: centre.nom.clone(),
        platform: centre.plateforme.clone().unwrap_or_default(),
        department,
        internal_id: centre.internal_id.clone(),
        address: metadata.and_then(|m| non_empty(m.address.as_deref())),
        coordinates: centre
            .location
            .as_ref()
            .map(|l| Coordinates::new(l.latitude, l.longitude)),
        url: non_empty(centre.url.as_deref()),
        appointment_count: centre.appointment_count,
        next_appointment: centre.prochain_rdv.as_deref().and_then(parse_timestamp),
        appointment_by_phone_only: centre.appointment_by_phone_only,
        phone_number: metadata.and_then(|m| non_empty(m.phone_number.as_deref())),
        schedules: centre
            .appointment_schedules
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|s| AppointmentSchedule {
                name: s.name.clone(),
                total: s.total,
            })
            .collect(),
        vaccine_types: centre.vaccine_type.clone().unwrap_or_default(),
    })
}

/// Parse an RFC 3339 timestamp. Unparseable values are treated as absent.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Empty strings mean "absent" in provider payloads.
fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::types::{LocationDto, MetadataDto, ScheduleDto};

    fn centre(name: &str) -> CentreDto {
        CentreDto {
            departement: "35".into(),
            nom: name.into(),
            url: Some("https://partners.doctolib.fr/x".into()),
            location: Some(LocationDto {
                latitude: 48.1,
                longitude: -1.7,
                city: None,
                cp: None,
            }),
            metadata: Some(MetadataDto {
                address: Some("1 place de la Mairie".into()),
                phone_number: Some("".into()),
                business_hours: None,
            }),
            prochain_rdv: Some("2021-05-13T09:20:00+02:00".into()),
            plateforme: Some("Doctolib".into()),
            centre_type: None,
            appointment_count: 3,
            internal_id: None,
            vaccine_type: None,
            appointment_by_phone_only: false,
            appointment_schedules: Some(vec![ScheduleDto {
                name: "chronodose".into(),
                from: None,
                to: None,
                total: 1,
            }]),
        }
    }

    fn area() -> DepartmentCode {
        DepartmentCode::parse("35").unwrap()
    }

    #[test]
    fn converts_centre_fields() {
        let loc = convert_centre(&centre("A")).unwrap();

        assert_eq!(loc.name, "A");
        assert_eq!(loc.platform, "Doctolib");
        assert_eq!(loc.coordinates, Some(Coordinates::new(48.1, -1.7)));
        assert_eq!(loc.appointment_count, 3);
        assert_eq!(loc.fast_slot_count(), 1);
        assert_eq!(
            loc.next_appointment.unwrap().to_rfc3339(),
            "2021-05-13T07:20:00+00:00"
        );
        // Empty phone number is absent
        assert_eq!(loc.phone_number, None);
        assert_eq!(loc.address.as_deref(), Some("1 place de la Mairie"));
    }

    #[test]
    fn empty_url_is_absent() {
        let mut dto = centre("A");
        dto.url = Some(String::new());
        assert_eq!(convert_centre(&dto).unwrap().url, None);
    }

    #[test]
    fn unparseable_next_appointment_is_absent() {
        let mut dto = centre("A");
        dto.prochain_rdv = Some("demain".into());
        assert_eq!(convert_centre(&dto).unwrap().next_appointment, None);
    }

    #[test]
    fn invalid_department_is_rejected() {
        let mut dto = centre("A");
        dto.departement = "Ille-et-Vilaine".into();
        assert!(matches!(
            convert_centre(&dto),
            Err(ConversionError::InvalidDepartment(_))
        ));
    }

    #[test]
    fn file_keeps_lists_disjoint() {
        let file = DepartmentFile {
            version: Some(1),
            last_updated: "2021-05-12T10:00:00+02:00".into(),
            centres_disponibles: vec![centre("A"), centre("B")],
            centres_indisponibles: vec![centre("B"), centre("C")],
        };

        let dataset = convert_department_file(&file, area()).unwrap();

        assert_eq!(dataset.available.len(), 2);
        assert_eq!(dataset.unavailable.len(), 1);
        assert_eq!(dataset.unavailable[0].name, "C");
        assert_eq!(dataset.area_codes, vec![area()]);
    }

    #[test]
    fn file_skips_invalid_centres() {
        let mut bad = centre("Bad");
        bad.departement = "???".into();
        let file = DepartmentFile {
            version: None,
            last_updated: "2021-05-12T10:00:00Z".into(),
            centres_disponibles: vec![bad, centre("Good")],
            centres_indisponibles: vec![],
        };

        let dataset = convert_department_file(&file, area()).unwrap();
        assert_eq!(dataset.available.len(), 1);
        assert_eq!(dataset.available[0].name, "Good");
    }

    #[test]
    fn file_requires_valid_freshness_timestamp() {
        let file = DepartmentFile {
            version: None,
            last_updated: "yesterday".into(),
            centres_disponibles: vec![],
            centres_indisponibles: vec![],
        };

        assert!(matches!(
            convert_department_file(&file, area()),
            Err(ConversionError::InvalidTimestamp(_))
        ));
    }
}
