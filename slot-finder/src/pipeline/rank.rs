//! Location ranking for search results.
//!
//! Every location gets a string key `"{bucket}__{secondary}"`. Buckets group
//! locations by how useful they are to someone trying to book; the secondary
//! part orders within a bucket. Both parts are fixed-width so plain string
//! comparison gives the intended order.

use crate::domain::SortCriterion;

use super::display::DisplayableLocation;

/// Encoded distance for locations without a known distance.
///
/// Larger than any distance on Earth (about 20 015 km), so such locations
/// sort last within their bucket.
pub const UNBOUNDED_DISTANCE_M: u64 = 99_999_999;

/// Compute the sort key of a location for the given criterion.
pub fn sort_key(location: &DisplayableLocation, criterion: SortCriterion) -> String {
    match criterion {
        SortCriterion::Date => date_key(location),
        SortCriterion::Distance => distance_key(location),
    }
}

/// Bucket then next-appointment time.
///
/// Buckets:
/// 0. bookable online, has slots, next slot known
/// 1. bookable online, has slots, next slot unknown
/// 2. phone-only with a number to call
/// 3. bookable online, no slots
/// 4. everything else
///
/// A missing next-appointment time encodes as 0 and sorts first within its
/// bucket.
fn date_key(location: &DisplayableLocation) -> String {
    let site = &location.location;

    let bucket = if site.is_reachable_by_phone() {
        2
    } else if site.url.is_some() {
        match (site.appointment_count, site.next_appointment) {
            (0, _) => 3,
            (_, Some(_)) => 0,
            (_, None) => 1,
        }
    } else {
        4
    };

    let millis = site
        .next_appointment
        .map(|t| t.timestamp_millis().max(0))
        .unwrap_or(0);

    format!("{bucket}__{millis:015}")
}

/// Bucket then distance in meters.
///
/// Bucket 0 holds sites one can act on now (bookable online with slots, or
/// phone-only with a number); everything else is bucket 1.
fn distance_key(location: &DisplayableLocation) -> String {
    let site = &location.location;

    let actionable =
        (site.url.is_some() && site.appointment_count != 0) || site.is_reachable_by_phone();
    let bucket = if actionable { 0 } else { 1 };

    let meters = location
        .distance_km
        .map(|km| ((km * 1000.0).round() as u64).min(UNBOUNDED_DISTANCE_M))
        .unwrap_or(UNBOUNDED_DISTANCE_M);

    format!("{bucket}__{meters:08}")
}

/// Sort locations by the key for `criterion`, best first.
///
/// The sort is stable: locations with equal keys keep their input order.
pub fn rank_locations(
    mut locations: Vec<DisplayableLocation>,
    criterion: SortCriterion,
) -> Vec<DisplayableLocation> {
    locations.sort_by_cached_key(|l| sort_key(l, criterion));
    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentLocation, DepartmentCode};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 5, 12, hour, 0, 0).unwrap()
    }

    fn site(name: &str) -> AppointmentLocation {
        AppointmentLocation {
            name: name.to_string(),
            platform: "Doctolib".to_string(),
            department: DepartmentCode::parse("35").unwrap(),
            internal_id: None,
            address: None,
            coordinates: None,
            url: Some(format!("https://example.org/{name}")),
            appointment_count: 5,
            next_appointment: Some(at(9)),
            appointment_by_phone_only: false,
            phone_number: None,
            schedules: Vec::new(),
            vaccine_types: Vec::new(),
        }
    }

    fn displayable(location: AppointmentLocation) -> DisplayableLocation {
        DisplayableLocation {
            location,
            is_available: true,
            distance_km: None,
        }
    }

    fn phone_only(name: &str) -> AppointmentLocation {
        AppointmentLocation {
            url: None,
            appointment_by_phone_only: true,
            phone_number: Some("02 99 00 00 00".to_string()),
            appointment_count: 0,
            next_appointment: None,
            ..site(name)
        }
    }

    fn names(locations: &[DisplayableLocation]) -> Vec<&str> {
        locations.iter().map(|l| l.location.name.as_str()).collect()
    }

    #[test]
    fn date_key_format() {
        let key = sort_key(&displayable(site("A")), SortCriterion::Date);

        assert_eq!(key, format!("0__{:015}", at(9).timestamp_millis()));
        assert_eq!(key.len(), 1 + 2 + 15);
    }

    #[test]
    fn date_buckets() {
        let known = site("known");
        let unknown = AppointmentLocation {
            next_appointment: None,
            ..site("unknown")
        };
        let empty = AppointmentLocation {
            appointment_count: 0,
            ..site("empty")
        };
        let offline = AppointmentLocation {
            url: None,
            ..site("offline")
        };

        let bucket = |l: AppointmentLocation| {
            sort_key(&displayable(l), SortCriterion::Date)[..1].to_string()
        };

        assert_eq!(bucket(known), "0");
        assert_eq!(bucket(unknown), "1");
        assert_eq!(bucket(phone_only("phone")), "2");
        assert_eq!(bucket(empty), "3");
        assert_eq!(bucket(offline), "4");
    }

    #[test]
    fn phone_only_without_number_is_not_phone_bucket() {
        let no_number = AppointmentLocation {
            phone_number: None,
            ..phone_only("silent")
        };

        assert!(sort_key(&displayable(no_number), SortCriterion::Date).starts_with("4__"));
    }

    #[test]
    fn missing_next_appointment_sorts_first_in_bucket() {
        // Bucket 2 ignores the timestamp when choosing the bucket, so a
        // phone-only site with no known slot lands ahead of one with a slot.
        let with_time = AppointmentLocation {
            next_appointment: Some(at(8)),
            ..phone_only("with time")
        };
        let without_time = phone_only("without time");

        let ranked = rank_locations(
            vec![displayable(with_time), displayable(without_time)],
            SortCriterion::Date,
        );

        assert_eq!(names(&ranked), vec!["without time", "with time"]);
    }

    #[test]
    fn date_orders_by_time_within_bucket() {
        let late = AppointmentLocation {
            next_appointment: Some(at(15)),
            ..site("late")
        };
        let early = AppointmentLocation {
            next_appointment: Some(at(8)),
            ..site("early")
        };

        let ranked = rank_locations(
            vec![displayable(late), displayable(early)],
            SortCriterion::Date,
        );

        assert_eq!(names(&ranked), vec!["early", "late"]);
    }

    #[test]
    fn distance_key_format() {
        let location = DisplayableLocation {
            distance_km: Some(2.3456),
            ..displayable(site("A"))
        };

        assert_eq!(sort_key(&location, SortCriterion::Distance), "0__00002346");
    }

    #[test]
    fn distance_buckets() {
        let bucket = |l: AppointmentLocation| {
            sort_key(&displayable(l), SortCriterion::Distance)[..1].to_string()
        };

        assert_eq!(bucket(site("bookable")), "0");
        assert_eq!(bucket(phone_only("phone")), "0");
        assert_eq!(
            bucket(AppointmentLocation {
                appointment_count: 0,
                ..site("empty")
            }),
            "1"
        );
        assert_eq!(
            bucket(AppointmentLocation {
                url: None,
                ..site("offline")
            }),
            "1"
        );
    }

    #[test]
    fn undefined_distance_sorts_last_in_bucket() {
        let far = DisplayableLocation {
            distance_km: Some(20_015.0),
            ..displayable(site("antipode"))
        };
        let unknown = displayable(site("unknown"));

        assert_eq!(
            sort_key(&unknown, SortCriterion::Distance),
            format!("0__{UNBOUNDED_DISTANCE_M}")
        );

        let ranked = rank_locations(vec![unknown, far], SortCriterion::Distance);
        assert_eq!(names(&ranked), vec!["antipode", "unknown"]);
    }

    #[test]
    fn distance_bucket_beats_distance() {
        let near_empty = DisplayableLocation {
            distance_km: Some(0.5),
            ..displayable(AppointmentLocation {
                appointment_count: 0,
                ..site("near but empty")
            })
        };
        let far_bookable = DisplayableLocation {
            distance_km: Some(80.0),
            ..displayable(site("far but bookable"))
        };

        let ranked = rank_locations(vec![near_empty, far_bookable], SortCriterion::Distance);

        assert_eq!(names(&ranked), vec!["far but bookable", "near but empty"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank_locations(
            vec![
                displayable(site("first")),
                displayable(site("second")),
                displayable(site("third")),
            ],
            SortCriterion::Date,
        );

        assert_eq!(names(&ranked), vec!["first", "second", "third"]);
    }

    #[test]
    fn rank_empty() {
        assert!(rank_locations(Vec::new(), SortCriterion::Distance).is_empty());
    }
}
