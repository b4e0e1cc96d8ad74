use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use slot_finder::cache::{CachedAreaDirectory, CachedLocationSource};
use slot_finder::config::EngineConfig;
use slot_finder::directory::{
    AreaDirectory, DirectoryClientConfig, HttpAreaDirectory, StaticAreaDirectory,
};
use slot_finder::neighbors::french_departments;
use slot_finder::session::SearchSession;
use slot_finder::source::{
    HttpLocationSource, HttpSourceConfig, LocationSource, MockLocationSource,
};
use slot_finder::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "slot_finder=info,tower_http=warn";

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = EngineConfig::from_env();

    match &config.mock_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving mock data");
            let directory =
                StaticAreaDirectory::from_dir(dir).expect("Failed to load mock directory");
            let source = MockLocationSource::from_dir(dir).expect("Failed to load mock datasets");
            serve(directory, source, config).await;
        }
        None => {
            let mut source_config = HttpSourceConfig::new();
            if let Some(url) = &config.data_url {
                source_config = source_config.with_base_url(url);
            }
            let mut directory_config = DirectoryClientConfig::new();
            if let Some(url) = &config.directory_url {
                directory_config = directory_config.with_base_url(url);
            }
            info!(
                data_url = %source_config.base_url,
                directory_url = %directory_config.base_url,
                "serving live data"
            );

            let source = HttpLocationSource::new(source_config)
                .expect("Failed to create location source");
            let directory = HttpAreaDirectory::new(directory_config)
                .expect("Failed to create directory client");

            serve(
                CachedAreaDirectory::new(directory, &config.cache),
                CachedLocationSource::new(source, &config.cache),
                config,
            )
            .await;
        }
    }
}

async fn serve<D: AreaDirectory, S: LocationSource>(directory: D, source: S, config: EngineConfig) {
    let directory = Arc::new(directory);
    let session = SearchSession::new(
        Arc::clone(&directory),
        Arc::new(source),
        french_departments(),
        &config,
    );

    let app = create_router(AppState::new(directory, session));

    let addr = config.listen_addr;
    info!(%addr, "slot finder listening");
    info!("  GET  /health           - Health check");
    info!("  GET  /api/departments  - Departments for the search widget");
    info!("  GET  /api/search       - Current resolved search");
    info!("  GET  /api/results      - Ranked results for the current search");
    info!("  GET  /api/status       - Progress and freshness signals");
    info!("  POST /api/selection    - Update the raw selection");
    info!("  POST /api/refresh      - Re-run the search and resume watching");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
