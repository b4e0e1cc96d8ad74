//! Merging per-area datasets into one candidate list.

use crate::domain::LocationDataset;

/// Merge a primary dataset with supplementary ones.
///
/// Both location lists and the area codes are concatenated in order, primary
/// first. The freshness marker is always the primary's, even when a
/// supplementary dataset is newer: the poller only ever compares against the
/// primary area.
pub fn merge_datasets(
    primary: LocationDataset,
    supplementary: impl IntoIterator<Item = LocationDataset>,
) -> LocationDataset {
    supplementary
        .into_iter()
        .fold(primary, |mut merged, extra| {
            merged.area_codes.extend(extra.area_codes);
            merged.available.extend(extra.available);
            merged.unavailable.extend(extra.unavailable);
            merged
        })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{AppointmentLocation, DepartmentCode};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn location(department: DepartmentCode, index: usize) -> AppointmentLocation {
        AppointmentLocation {
            name: format!("Centre {index}"),
            platform: "Doctolib".to_string(),
            department,
            internal_id: None,
            address: None,
            coordinates: None,
            url: None,
            appointment_count: 0,
            next_appointment: None,
            appointment_by_phone_only: false,
            phone_number: None,
            schedules: Vec::new(),
            vaccine_types: Vec::new(),
        }
    }

    fn dataset(department: &str, available: usize, unavailable: usize) -> LocationDataset {
        let department = DepartmentCode::parse(department).unwrap();
        LocationDataset {
            area_codes: vec![department],
            last_updated: Utc.with_ymd_and_hms(2021, 5, 12, 10, 0, 0).unwrap(),
            available: (0..available).map(|i| location(department, i)).collect(),
            unavailable: (0..unavailable)
                .map(|i| location(department, available + i))
                .collect(),
        }
    }

    proptest! {
        /// Merging preserves the per-list counts
        #[test]
        fn counts_preserved(
            sizes in prop::collection::vec((0usize..20, 0usize..20), 1..6)
        ) {
            let codes = ["35", "22", "44", "49", "50", "53"];
            let mut datasets: Vec<LocationDataset> = sizes
                .iter()
                .zip(codes)
                .map(|(&(a, u), c)| dataset(c, a, u))
                .collect();
            let primary = datasets.remove(0);

            let merged = merge_datasets(primary, datasets);

            let available: usize = sizes.iter().map(|(a, _)| a).sum();
            let unavailable: usize = sizes.iter().map(|(_, u)| u).sum();
            prop_assert_eq!(merged.available.len(), available);
            prop_assert_eq!(merged.unavailable.len(), unavailable);
            prop_assert_eq!(merged.area_codes.len(), sizes.len());

            for a in &merged.available {
                prop_assert!(merged.unavailable.iter().all(|u| u.identity() != a.identity()));
            }
        }
    }
}
