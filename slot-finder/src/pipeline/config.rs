//! Pipeline configuration.

/// Limits applied when turning datasets into a displayed result.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Municipality searches drop sites this far away or further (km).
    pub max_distance_km: f64,

    /// Maximum number of locations to display.
    pub max_results: usize,
}

impl PipelineConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_distance_km: f64, max_results: usize) -> Self {
        Self {
            max_distance_km,
            max_results,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_distance_km: 100.0,
            max_results: 180,
        }
    }
}
