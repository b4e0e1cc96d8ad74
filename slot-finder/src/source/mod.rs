//! Location dataset sources.
//!
//! The data provider publishes one JSON file per department listing every
//! vaccination site with its slot metadata. Key characteristics:
//! - Files are rebuilt periodically; `last_updated` is the only freshness
//!   marker, and it is per file
//! - Centres are split into "available" and "unavailable" lists
//! - Empty strings stand in for absent URLs and phone numbers

mod client;
mod convert;
mod error;
mod mock;
mod provider;
mod types;

pub use client::{HttpLocationSource, HttpSourceConfig};
pub use convert::{ConversionError, convert_centre, convert_department_file};
pub use error::SourceError;
pub use mock::MockLocationSource;
pub use provider::LocationSource;
pub use types::{CentreDto, DepartmentFile, LocationDto, MetadataDto, ScheduleDto};
