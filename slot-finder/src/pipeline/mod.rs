//! Location merge and transform pipeline.
//!
//! Turns raw per-department datasets into the ranked list shown for a
//! search. The pipeline is a pure transform; fetching the datasets is the
//! session's job.
//!
//! Stages run in a fixed order: merge, availability tagging, distance
//! annotation, fast-slot transform, filtering, ranking, capping.

mod config;
mod display;
mod merge;
mod rank;

pub use config::PipelineConfig;
pub use display::{DisplayResult, DisplayableLocation, build_display_result};
pub use merge::merge_datasets;
pub use rank::{UNBOUNDED_DISTANCE_M, rank_locations, sort_key};
