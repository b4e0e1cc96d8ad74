//! Engine configuration.
//!
//! Defaults suit the public provider; every value can be overridden with a
//! `SLOT_FINDER_*` environment variable. Unparseable overrides are logged
//! and ignored.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::CacheConfig;
use crate::pipeline::PipelineConfig;

/// Everything needed to wire up a search session and its server.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Settling delay before a raw selection is resolved.
    pub debounce: Duration,

    /// Delay between staleness checks.
    pub poll_interval: Duration,

    pub pipeline: PipelineConfig,

    pub cache: CacheConfig,

    /// Address the HTTP API listens on.
    pub listen_addr: SocketAddr,

    /// Base URL for location datasets (provider default when unset).
    pub data_url: Option<String>,

    /// Base URL for the area directory (provider default when unset).
    pub directory_url: Option<String>,

    /// Serve fixtures from this directory instead of the network.
    pub mock_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(20),
            poll_interval: Duration::from_secs(45),
            pipeline: PipelineConfig::default(),
            cache: CacheConfig::default(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_url: None,
            directory_url: None,
            mock_dir: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "SLOT_FINDER_DEBOUNCE_MS") {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SLOT_FINDER_POLL_INTERVAL_SECS") {
            if secs == 0 {
                warn!("SLOT_FINDER_POLL_INTERVAL_SECS must be positive, keeping default");
            } else {
                config.poll_interval = Duration::from_secs(secs);
            }
        }
        if let Some(km) = parse_var::<f64>(&lookup, "SLOT_FINDER_MAX_DISTANCE_KM") {
            config.pipeline.max_distance_km = km;
        }
        if let Some(n) = parse_var::<usize>(&lookup, "SLOT_FINDER_MAX_RESULTS") {
            config.pipeline.max_results = n;
        }
        if let Some(addr) = parse_var::<SocketAddr>(&lookup, "SLOT_FINDER_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        config.data_url = non_empty(&lookup, "SLOT_FINDER_DATA_URL");
        config.directory_url = non_empty(&lookup, "SLOT_FINDER_DIRECTORY_URL");
        config.mock_dir = non_empty(&lookup, "SLOT_FINDER_MOCK_DIR").map(PathBuf::from);

        config
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = non_empty(lookup, key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring invalid configuration value");
            None
        }
    }
}
