//! Area directory: department and municipality reference data.
//!
//! Resolves the codes typed into the search widget into areas with names
//! and coordinates. Lookups may fail to find anything; that is a normal
//! outcome, not an error.

mod client;
mod error;
mod memory;
mod provider;
mod types;

pub use client::{DirectoryClientConfig, HttpAreaDirectory};
pub use error::DirectoryError;
pub use memory::StaticAreaDirectory;
pub use provider::AreaDirectory;
pub use types::{CommuneDto, DepartmentDto};
