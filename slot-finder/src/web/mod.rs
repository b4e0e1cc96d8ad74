//! Web layer for the slot finder.
//!
//! A small JSON API over one search session: raw selection updates go in,
//! resolved search, ranked results and freshness signals come out.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
