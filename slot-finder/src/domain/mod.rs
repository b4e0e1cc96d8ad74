//! Domain types for the appointment finder.
//!
//! This module contains the validated value types the engine works with:
//! search areas, search requests and the location datasets published per
//! department. Codes enforce their invariants at construction time, so code
//! that receives these types can trust their validity.

mod area;
mod error;
mod location;
mod search;

pub use area::{
    Area, AreaKind, Coordinates, Department, DepartmentCode, InvalidDepartmentCode, Municipality,
};
pub use error::DomainError;
pub use location::{AppointmentLocation, AppointmentSchedule, LocationDataset, LocationIdentity};
pub use search::{FAST_SLOT_SCHEDULE, SearchMode, SearchRequest, SortCriterion};
