//! Search session: one user's search, its displayed result, and the
//! background freshness check.
//!
//! The resolver is the only writer of the current search and the pipeline
//! run in [`SearchSession::refresh`] the only writer of the displayed result.
//! Everything observable is exposed as `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::directory::AreaDirectory;
use crate::domain::{
    AreaKind, DepartmentCode, LocationDataset, SearchMode, SearchRequest, SortCriterion,
};
use crate::neighbors::AdjacentAreas;
use crate::pipeline::{DisplayResult, PipelineConfig, build_display_result, merge_datasets};
use crate::poller::StalenessPoller;
use crate::resolver::{RawSelection, RawSelectionUpdate, SelectionResolver};
use crate::source::{LocationSource, SourceError};

/// A dataset fetch failed during a refresh.
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch locations for {area}: {source}")]
pub struct RefreshError {
    pub area: DepartmentCode,
    pub source: SourceError,
}

struct SessionInner<D, S> {
    source: Arc<S>,
    neighbors: AdjacentAreas,
    pipeline: PipelineConfig,
    resolver: SelectionResolver<D>,
    poller: StalenessPoller<S>,
    displayed: watch::Sender<Option<Arc<DisplayResult>>>,
    /// Number of refreshes currently running.
    in_progress: watch::Sender<usize>,
}

/// Marks a refresh as running for as long as it lives.
struct InProgressGuard<'a>(&'a watch::Sender<usize>);

impl<'a> InProgressGuard<'a> {
    fn new(counter: &'a watch::Sender<usize>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self(counter)
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// A live search session.
///
/// Must be created inside a tokio runtime. Dropping the session stops its
/// background tasks.
pub struct SearchSession<D, S> {
    inner: Arc<SessionInner<D, S>>,
    driver: JoinHandle<()>,
}

impl<D: AreaDirectory, S: LocationSource> SearchSession<D, S> {
    pub fn new(
        directory: Arc<D>,
        source: Arc<S>,
        neighbors: AdjacentAreas,
        config: &EngineConfig,
    ) -> Self {
        let (resolver, published) = SelectionResolver::new(directory, config.debounce);
        let (displayed, displayed_rx) = watch::channel(None);
        let (in_progress, _) = watch::channel(0);

        let poller = StalenessPoller::new(
            Arc::clone(&source),
            config.poll_interval,
            resolver.subscribe(),
            displayed_rx,
        );

        let inner = Arc::new(SessionInner {
            source,
            neighbors,
            pipeline: config.pipeline.clone(),
            resolver,
            poller,
            displayed,
            in_progress,
        });

        let driver = tokio::spawn(drive(Arc::clone(&inner), published));

        Self { inner, driver }
    }

    pub fn set_area_kind(&self, kind: AreaKind) -> JoinHandle<()> {
        self.inner.resolver.set_area_kind(kind)
    }

    pub fn set_department_code(&self, code: impl Into<String>) -> JoinHandle<()> {
        self.inner.resolver.set_department_code(code)
    }

    pub fn set_municipality_code(&self, code: impl Into<String>) -> JoinHandle<()> {
        self.inner.resolver.set_municipality_code(code)
    }

    pub fn set_postal_code(&self, code: impl Into<String>) -> JoinHandle<()> {
        self.inner.resolver.set_postal_code(code)
    }

    pub fn set_mode(&self, mode: SearchMode) -> JoinHandle<()> {
        self.inner.resolver.set_mode(mode)
    }

    pub fn set_sort(&self, sort: SortCriterion) -> JoinHandle<()> {
        self.inner.resolver.set_sort(sort)
    }

    /// Apply several raw field changes at once.
    pub fn apply(&self, update: RawSelectionUpdate) -> JoinHandle<()> {
        self.inner.resolver.apply(update)
    }

    /// Re-run the pipeline for the current search.
    ///
    /// Returns `Ok(None)` when no search is active.
    pub async fn refresh(&self) -> Result<Option<Arc<DisplayResult>>, RefreshError> {
        let Some(request) = self.inner.resolver.current() else {
            return Ok(None);
        };
        self.inner.refresh(&request).await.map(Some)
    }

    /// Consumer action on "update available": refresh and watch again.
    ///
    /// Watching resumes whether or not the refresh succeeds.
    pub async fn apply_update(&self) -> Result<Option<Arc<DisplayResult>>, RefreshError> {
        self.inner.poller.clear_update_available();
        let result = self.refresh().await;
        if self.inner.resolver.current().is_some() {
            self.inner.poller.start();
        }
        result
    }

    /// Stop background work. The session stays readable.
    pub fn shutdown(&self) {
        self.driver.abort();
        self.inner.poller.stop();
    }

    pub fn current_search(&self) -> Option<SearchRequest> {
        self.inner.resolver.current()
    }

    pub fn raw_selection(&self) -> RawSelection {
        self.inner.resolver.raw()
    }

    pub fn displayed(&self) -> Option<Arc<DisplayResult>> {
        self.inner.displayed.borrow().clone()
    }

    pub fn search_in_progress(&self) -> bool {
        *self.inner.in_progress.borrow() > 0
    }

    pub fn update_available(&self) -> bool {
        self.inner.poller.update_available()
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.inner.poller.last_checked()
    }

    pub fn is_watching(&self) -> bool {
        self.inner.poller.is_watching()
    }

    pub fn subscribe_search(&self) -> watch::Receiver<Option<SearchRequest>> {
        self.inner.resolver.subscribe()
    }

    pub fn subscribe_displayed(&self) -> watch::Receiver<Option<Arc<DisplayResult>>> {
        self.inner.displayed.subscribe()
    }

    /// Number of refreshes running; non-zero means "search in progress".
    pub fn subscribe_in_progress(&self) -> watch::Receiver<usize> {
        self.inner.in_progress.subscribe()
    }

    pub fn subscribe_update_available(&self) -> watch::Receiver<bool> {
        self.inner.poller.subscribe_update_available()
    }

    pub fn subscribe_last_checked(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.poller.subscribe_last_checked()
    }
}

impl<D, S> Drop for SearchSession<D, S> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Run each newly published search through the pipeline, in order.
async fn drive<D: AreaDirectory, S: LocationSource>(
    inner: Arc<SessionInner<D, S>>,
    mut published: mpsc::UnboundedReceiver<SearchRequest>,
) {
    while let Some(request) = published.recv().await {
        inner.poller.stop();
        inner.poller.clear_update_available();

        if let Err(e) = inner.refresh(&request).await {
            warn!(search = %request.label(), error = %e, "search failed");
        }
        inner.poller.start();
    }
}

impl<D: AreaDirectory, S: LocationSource> SessionInner<D, S> {
    /// Fetch, merge and rank the datasets for `request`.
    ///
    /// The displayed result is only replaced if `request` is still the
    /// current search once the fetches complete.
    async fn refresh(&self, request: &SearchRequest) -> Result<Arc<DisplayResult>, RefreshError> {
        let _guard = InProgressGuard::new(&self.in_progress);

        let primary_area = request.department_code();
        let supplementary_areas: &[DepartmentCode] = match request {
            SearchRequest::ByMunicipality { .. } => self.neighbors.neighbors_of(&primary_area),
            SearchRequest::ByDepartment { .. } => &[],
        };

        debug!(
            area = %primary_area,
            neighbors = supplementary_areas.len(),
            "fetching datasets"
        );

        let primary = self.fetch(primary_area).await?;
        let mut fetches = Vec::with_capacity(supplementary_areas.len());
        for &area in supplementary_areas {
            fetches.push(self.fetch(area));
        }
        let supplementary = try_join_all(fetches).await?;

        let merged = merge_datasets(primary, supplementary);
        let result = Arc::new(build_display_result(merged, request, &self.pipeline));

        if self.resolver.current().as_ref() == Some(request) {
            info!(
                search = %request.label(),
                locations = result.locations.len(),
                visible = result.visible_count(request.mode()),
                last_updated = %result.last_updated,
                "result updated"
            );
            self.displayed.send_replace(Some(Arc::clone(&result)));
        } else {
            debug!(search = %request.label(), "search changed during refresh, result discarded");
        }

        Ok(result)
    }

    async fn fetch(&self, area: DepartmentCode) -> Result<LocationDataset, RefreshError> {
        self.source
            .fetch_locations(area)
            .await
            .map_err(|source| RefreshError { area, source })
    }
}
