//! Staleness poller.
//!
//! While a result is displayed, periodically re-fetch the primary area's
//! dataset and compare its freshness marker with the displayed one. On the
//! first difference, flag "update available" and stop; the consumer decides
//! when to re-run the search and restart the poller.
//!
//! The timer is self-arming: the next tick is scheduled only once the
//! current one has finished, so slow fetches never overlap.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::SearchRequest;
use crate::pipeline::DisplayResult;
use crate::source::LocationSource;

/// Result of a single poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No search is active; nothing was fetched.
    NoSearch,
    /// Live data matches the displayed result (or could not be fetched).
    Unchanged,
    /// Live data is newer than the displayed result.
    UpdateAvailable,
}

struct PollerInner<S> {
    source: Arc<S>,
    interval: Duration,
    search: watch::Receiver<Option<SearchRequest>>,
    displayed: watch::Receiver<Option<Arc<DisplayResult>>>,
    update_available: watch::Sender<bool>,
    last_checked: watch::Sender<Option<DateTime<Utc>>>,
}

/// Background freshness watcher for the current search.
///
/// Idle until [`start`](Self::start); Watching until a change is detected or
/// [`stop`](Self::stop) is called.
pub struct StalenessPoller<S> {
    inner: Arc<PollerInner<S>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: LocationSource> StalenessPoller<S> {
    /// Create an idle poller observing the given search and displayed result.
    pub fn new(
        source: Arc<S>,
        interval: Duration,
        search: watch::Receiver<Option<SearchRequest>>,
        displayed: watch::Receiver<Option<Arc<DisplayResult>>>,
    ) -> Self {
        let (update_available, _) = watch::channel(false);
        let (last_checked, _) = watch::channel(None);

        Self {
            inner: Arc::new(PollerInner {
                source,
                interval,
                search,
                displayed,
                update_available,
                last_checked,
            }),
            task: Mutex::new(None),
        }
    }

    /// Begin watching. No-op when already watching.
    pub fn start(&self) {
        let Ok(mut task) = self.task.lock() else {
            return;
        };
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(inner.interval).await;
                if inner.tick().await == TickOutcome::UpdateAvailable {
                    break;
                }
            }
        }));
        debug!(interval_secs = self.inner.interval.as_secs(), "poller started");
    }

    /// Stop watching. No-op when idle.
    pub fn stop(&self) {
        let Ok(mut task) = self.task.lock() else {
            return;
        };
        if let Some(task) = task.take() {
            task.abort();
            debug!("poller stopped");
        }
    }

    pub fn is_watching(&self) -> bool {
        self.task
            .lock()
            .map(|t| t.as_ref().is_some_and(|t| !t.is_finished()))
            .unwrap_or(false)
    }

    /// Run one tick now, outside the timer.
    pub async fn check_once(&self) -> TickOutcome {
        self.inner.tick().await
    }

    /// Reset the "update available" flag, e.g. when a new search starts.
    pub fn clear_update_available(&self) {
        self.inner.update_available.send_if_modified(|flag| {
            let was_set = *flag;
            *flag = false;
            was_set
        });
    }

    pub fn update_available(&self) -> bool {
        *self.inner.update_available.borrow()
    }

    pub fn subscribe_update_available(&self) -> watch::Receiver<bool> {
        self.inner.update_available.subscribe()
    }

    /// When live data was last found to match the displayed result.
    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_checked.borrow()
    }

    pub fn subscribe_last_checked(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_checked.subscribe()
    }
}

impl<S> Drop for StalenessPoller<S> {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}

impl<S: LocationSource> PollerInner<S> {
    async fn tick(&self) -> TickOutcome {
        let search = self.search.borrow().clone();
        let Some(search) = search else {
            return TickOutcome::NoSearch;
        };
        let area = search.department_code();

        let live = match self.source.fetch_locations(area).await {
            Ok(dataset) => dataset.last_updated,
            Err(e) => {
                warn!(%area, error = %e, "staleness check failed");
                return TickOutcome::Unchanged;
            }
        };

        // A result built for another search never counts as current.
        let displayed = self
            .displayed
            .borrow()
            .as_ref()
            .filter(|r| r.search == search)
            .map(|r| r.last_updated);

        if displayed == Some(live) {
            self.last_checked.send_replace(Some(Utc::now()));
            return TickOutcome::Unchanged;
        }

        let newly_flagged = self.update_available.send_if_modified(|flag| {
            let was_set = *flag;
            *flag = true;
            !was_set
        });
        if newly_flagged {
            info!(%area, %live, ?displayed, "update available");
        }
        TickOutcome::UpdateAvailable
    }
}
