//! Turning a merged dataset into the result shown to the user.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    AppointmentLocation, DepartmentCode, LocationDataset, SearchMode, SearchRequest,
};
use crate::geo::distance_km;

use super::config::PipelineConfig;
use super::rank::rank_locations;

/// A location prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayableLocation {
    /// The site; in fast-slot mode its `appointment_count` is the fast-slot
    /// count.
    pub location: AppointmentLocation,
    /// Whether the provider listed the site as available.
    pub is_available: bool,
    /// Distance from the searched municipality, if known.
    pub distance_km: Option<f64>,
}

impl DisplayableLocation {
    /// Whether the location should be shown for the given mode.
    pub fn is_visible(&self, mode: SearchMode) -> bool {
        match mode {
            SearchMode::FastSlot => self.location.appointment_count > 0,
            SearchMode::Standard => self.is_available,
        }
    }
}

/// The ranked, capped result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayResult {
    /// The search this result was built for.
    pub search: SearchRequest,
    pub area_codes: Vec<DepartmentCode>,
    pub last_updated: DateTime<Utc>,
    pub locations: Vec<DisplayableLocation>,
}

impl DisplayResult {
    /// Locations passing the visibility predicate for `mode`, in rank order.
    pub fn visible(&self, mode: SearchMode) -> impl Iterator<Item = &DisplayableLocation> {
        self.locations.iter().filter(move |l| l.is_visible(mode))
    }

    pub fn visible_count(&self, mode: SearchMode) -> usize {
        self.visible(mode).count()
    }

    /// Sum of appointment counts over all displayed locations.
    pub fn total_appointments(&self) -> u64 {
        self.locations
            .iter()
            .map(|l| u64::from(l.location.appointment_count))
            .sum()
    }
}

/// Build the displayed result for `request` from a merged dataset.
///
/// Steps, in order: tag availability, annotate distance (municipality
/// searches only), apply the fast-slot count, filter, rank, cap.
pub fn build_display_result(
    merged: LocationDataset,
    request: &SearchRequest,
    config: &PipelineConfig,
) -> DisplayResult {
    let LocationDataset {
        area_codes,
        last_updated,
        available,
        unavailable,
    } = merged;

    let origin = request.municipality().map(|m| m.coordinates);
    let mode = request.mode();

    let candidates = available
        .into_iter()
        .map(|l| (l, true))
        .chain(unavailable.into_iter().map(|l| (l, false)))
        .map(|(mut location, is_available)| {
            let distance_km = origin
                .zip(location.coordinates)
                .map(|(from, to)| distance_km(from, to));

            if mode == SearchMode::FastSlot {
                location.appointment_count = location.fast_slot_count();
            }

            DisplayableLocation {
                location,
                is_available,
                distance_km,
            }
        })
        .filter(|l| {
            // Unknown distance counts as too far.
            origin.is_none()
                || l.distance_km
                    .is_some_and(|d| d < config.max_distance_km)
        })
        .filter(|l| mode != SearchMode::FastSlot || !l.location.appointment_by_phone_only)
        .collect();

    let mut locations = rank_locations(candidates, request.sort());
    locations.truncate(config.max_results);

    DisplayResult {
        search: request.clone(),
        area_codes,
        last_updated,
        locations,
    }
}
