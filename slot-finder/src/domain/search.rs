//! Search requests: what the user is currently looking for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::area::{Area, Department, DepartmentCode, Municipality};
use super::error::DomainError;

/// Name of the schedule bucket holding last-minute appointments.
pub const FAST_SLOT_SCHEDULE: &str = "chronodose";

/// Which appointments a search surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// Every appointment the platforms expose.
    #[default]
    #[serde(rename = "standard")]
    Standard,
    /// Only short-notice appointments from the fast-slot schedule bucket.
    #[serde(rename = "chronodose")]
    FastSlot,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Standard => "standard",
            SearchMode::FastSlot => FAST_SLOT_SCHEDULE,
        }
    }
}

impl FromStr for SearchMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(SearchMode::Standard),
            FAST_SLOT_SCHEDULE => Ok(SearchMode::FastSlot),
            other => Err(DomainError::UnsupportedSearchMode(other.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranking criterion for the displayed locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriterion {
    /// Soonest next appointment first.
    Date,
    /// Nearest location first.
    Distance,
}

impl SortCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::Date => "date",
            SortCriterion::Distance => "distance",
        }
    }
}

impl FromStr for SortCriterion {
    type Err = DomainError;

    /// Parse a criterion name. Anything other than `date` or `distance` is
    /// a caller bug, reported as [`DomainError::UnsupportedSortCriterion`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortCriterion::Date),
            "distance" => Ok(SortCriterion::Distance),
            other => Err(DomainError::UnsupportedSortCriterion(other.to_string())),
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The current user intent.
///
/// Exactly one scope (municipality or department) is carried. Values are
/// never mutated in place: a change of mode or area produces a new request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum SearchRequest {
    ByMunicipality {
        municipality: Municipality,
        mode: SearchMode,
        sort: SortCriterion,
    },
    ByDepartment {
        department: Department,
        mode: SearchMode,
        sort: SortCriterion,
    },
}

impl SearchRequest {
    /// Search around a municipality, nearest first.
    pub fn by_municipality(municipality: Municipality, mode: SearchMode) -> Self {
        SearchRequest::ByMunicipality {
            municipality,
            mode,
            sort: SortCriterion::Distance,
        }
    }

    /// Search a whole department, soonest first.
    pub fn by_department(department: Department, mode: SearchMode) -> Self {
        SearchRequest::ByDepartment {
            department,
            mode,
            sort: SortCriterion::Date,
        }
    }

    /// Same request with another ranking criterion.
    pub fn with_sort(self, sort: SortCriterion) -> Self {
        match self {
            SearchRequest::ByMunicipality {
                municipality, mode, ..
            } => SearchRequest::ByMunicipality {
                municipality,
                mode,
                sort,
            },
            SearchRequest::ByDepartment {
                department, mode, ..
            } => SearchRequest::ByDepartment {
                department,
                mode,
                sort,
            },
        }
    }

    /// Same request with another search mode.
    pub fn with_mode(self, mode: SearchMode) -> Self {
        match self {
            SearchRequest::ByMunicipality {
                municipality, sort, ..
            } => SearchRequest::ByMunicipality {
                municipality,
                mode,
                sort,
            },
            SearchRequest::ByDepartment {
                department, sort, ..
            } => SearchRequest::ByDepartment {
                department,
                mode,
                sort,
            },
        }
    }

    pub fn mode(&self) -> SearchMode {
        match self {
            SearchRequest::ByMunicipality { mode, .. }
            | SearchRequest::ByDepartment { mode, .. } => *mode,
        }
    }

    pub fn sort(&self) -> SortCriterion {
        match self {
            SearchRequest::ByMunicipality { sort, .. }
            | SearchRequest::ByDepartment { sort, .. } => *sort,
        }
    }

    /// The municipality searched around, if municipality-scoped.
    pub fn municipality(&self) -> Option<&Municipality> {
        match self {
            SearchRequest::ByMunicipality { municipality, .. } => Some(municipality),
            SearchRequest::ByDepartment { .. } => None,
        }
    }

    /// The primary department: the one whose freshness marker is watched.
    pub fn department_code(&self) -> DepartmentCode {
        match self {
            SearchRequest::ByMunicipality { municipality, .. } => municipality.department,
            SearchRequest::ByDepartment { department, .. } => department.code,
        }
    }

    /// The searched area.
    pub fn area(&self) -> Area {
        match self {
            SearchRequest::ByMunicipality { municipality, .. } => {
                Area::Municipality(municipality.clone())
            }
            SearchRequest::ByDepartment { department, .. } => Area::Department(department.clone()),
        }
    }

    /// Human-readable label of the searched area.
    pub fn label(&self) -> String {
        self.area().label()
    }
}
