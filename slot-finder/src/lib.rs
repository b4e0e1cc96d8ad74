//! Vaccination appointment finder.
//!
//! Resolves a municipality or department selection into a search, merges
//! the provider's per-department location datasets, ranks the sites by date
//! or distance, and watches for fresher data in the background.

pub mod cache;
pub mod config;
pub mod directory;
pub mod domain;
pub mod geo;
pub mod neighbors;
pub mod pipeline;
pub mod poller;
pub mod resolver;
pub mod session;
pub mod source;
pub mod web;
