//! Selection resolver.
//!
//! The search widget reports raw field changes (area kind, typed codes,
//! search mode) one at a time and often in quick bursts. Each change
//! schedules a resolution after a short settling delay; every resolution
//! carries a generation number and only the latest one may publish.
//!
//! Completion order of directory lookups is not guaranteed, so the
//! generation is checked both after the delay and after the lookup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::directory::AreaDirectory;
use crate::domain::{AreaKind, DepartmentCode, SearchMode, SearchRequest, SortCriterion};

/// The raw, unvalidated fields of the search widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSelection {
    pub area_kind: Option<AreaKind>,
    pub department_code: Option<String>,
    pub municipality_code: Option<String>,
    pub postal_code: Option<String>,
    pub mode: Option<SearchMode>,
    /// Explicit sort; the default depends on the area kind.
    pub sort: Option<SortCriterion>,
}

/// A partial update to the raw selection. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSelectionUpdate {
    pub area_kind: Option<AreaKind>,
    pub department_code: Option<String>,
    pub municipality_code: Option<String>,
    pub postal_code: Option<String>,
    pub mode: Option<SearchMode>,
    pub sort: Option<SortCriterion>,
}

impl RawSelection {
    fn merge(&mut self, update: RawSelectionUpdate) {
        if let Some(kind) = update.area_kind {
            self.area_kind = Some(kind);
        }
        if let Some(code) = update.department_code {
            self.department_code = Some(code);
        }
        if let Some(code) = update.municipality_code {
            self.municipality_code = Some(code);
        }
        if let Some(code) = update.postal_code {
            self.postal_code = Some(code);
        }
        if let Some(mode) = update.mode {
            self.mode = Some(mode);
        }
        if let Some(sort) = update.sort {
            self.sort = Some(sort);
        }
    }
}

struct ResolverInner<D> {
    directory: Arc<D>,
    debounce: Duration,
    raw: Mutex<RawSelection>,
    generation: AtomicU64,
    current: watch::Sender<Option<SearchRequest>>,
    published: mpsc::UnboundedSender<SearchRequest>,
}

/// Turns raw selections into search requests, discarding superseded ones.
///
/// Every successful resolution updates the current search and is sent once
/// on the channel returned by [`SelectionResolver::new`].
pub struct SelectionResolver<D> {
    inner: Arc<ResolverInner<D>>,
}

impl<D> Clone for SelectionResolver<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: AreaDirectory> SelectionResolver<D> {
    /// Create a resolver and the receiver of published search requests.
    pub fn new(
        directory: Arc<D>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchRequest>) {
        let (current, _) = watch::channel(None);
        let (published, rx) = mpsc::unbounded_channel();

        let resolver = Self {
            inner: Arc::new(ResolverInner {
                directory,
                debounce,
                raw: Mutex::new(RawSelection::default()),
                generation: AtomicU64::new(0),
                current,
                published,
            }),
        };

        (resolver, rx)
    }

    /// Watch the current search.
    pub fn subscribe(&self) -> watch::Receiver<Option<SearchRequest>> {
        self.inner.current.subscribe()
    }

    /// The current search, if one has been resolved.
    pub fn current(&self) -> Option<SearchRequest> {
        self.inner.current.borrow().clone()
    }

    /// A copy of the raw fields.
    pub fn raw(&self) -> RawSelection {
        self.inner.lock_raw().clone()
    }

    /// The generation of the most recently scheduled resolution.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub fn set_area_kind(&self, kind: AreaKind) -> JoinHandle<()> {
        self.apply(RawSelectionUpdate {
            area_kind: Some(kind),
            ..Default::default()
        })
    }

    pub fn set_department_code(&self, code: impl Into<String>) -> JoinHandle<()> {
        self.apply(RawSelectionUpdate {
            department_code: Some(code.into()),
            ..Default::default()
        })
    }

    pub fn set_municipality_code(&self, code: impl Into<String>) -> JoinHandle<()> {
        self.apply(RawSelectionUpdate {
            municipality_code: Some(code.into()),
            ..Default::default()
        })
    }

    pub fn set_postal_code(&self, code: impl Into<String>) -> JoinHandle<()> {
        self.apply(RawSelectionUpdate {
            postal_code: Some(code.into()),
            ..Default::default()
        })
    }

    pub fn set_mode(&self, mode: SearchMode) -> JoinHandle<()> {
        self.apply(RawSelectionUpdate {
            mode: Some(mode),
            ..Default::default()
        })
    }

    pub fn set_sort(&self, sort: SortCriterion) -> JoinHandle<()> {
        self.apply(RawSelectionUpdate {
            sort: Some(sort),
            ..Default::default()
        })
    }

    /// Apply a (possibly multi-field) update and schedule a resolution.
    ///
    /// An empty update changes nothing but still schedules, superseding any
    /// pending resolution.
    pub fn apply(&self, update: RawSelectionUpdate) -> JoinHandle<()> {
        self.inner.lock_raw().merge(update);
        self.schedule()
    }

    /// Schedule a resolution of the current raw fields.
    ///
    /// The returned handle completes once the resolution has published or
    /// been discarded.
    pub fn schedule(&self) -> JoinHandle<()> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let raw = self.raw();
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if !inner.is_latest(generation) {
                debug!(generation, "resolution superseded before lookup");
                return;
            }

            let Some(request) = inner.resolve(&raw).await else {
                return;
            };

            if !inner.is_latest(generation) {
                debug!(generation, "resolution superseded during lookup");
                return;
            }

            info!(generation, search = %request.label(), mode = %request.mode(), "search resolved");
            inner.current.send_replace(Some(request.clone()));
            // The receiver only goes away when the session shuts down.
            let _ = inner.published.send(request);
        })
    }
}

impl<D> ResolverInner<D> {
    /// The raw fields stay valid after a panic elsewhere, so a poisoned
    /// lock is recovered rather than dropping the user's input.
    fn lock_raw(&self) -> MutexGuard<'_, RawSelection> {
        self.raw.lock().unwrap_or_else(|poisoned| {
            warn!("raw selection lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<D: AreaDirectory> ResolverInner<D> {
    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Look up the area named by `raw`. `None` when incomplete or unknown.
    async fn resolve(&self, raw: &RawSelection) -> Option<SearchRequest> {
        let kind = raw.area_kind?;
        let mode = raw.mode?;

        let request = match kind {
            AreaKind::Municipality => {
                let code = raw.municipality_code.as_deref()?;
                let postal_code = raw.postal_code.as_deref()?;

                match self.directory.find_municipality(postal_code, code).await {
                    Ok(Some(municipality)) => SearchRequest::by_municipality(municipality, mode),
                    Ok(None) => {
                        debug!(postal_code, code, "unknown municipality");
                        return None;
                    }
                    Err(e) => {
                        warn!(postal_code, code, error = %e, "municipality lookup failed");
                        return None;
                    }
                }
            }
            AreaKind::Department => {
                let typed = raw.department_code.as_deref()?;
                let Ok(code) = DepartmentCode::parse_normalized(typed) else {
                    debug!(code = typed, "invalid department code");
                    return None;
                };

                match self.directory.list_departments().await {
                    Ok(departments) => {
                        let department = departments.into_iter().find(|d| d.code == code);
                        let Some(department) = department else {
                            debug!(%code, "unknown department");
                            return None;
                        };
                        SearchRequest::by_department(department, mode)
                    }
                    Err(e) => {
                        warn!(%code, error = %e, "department lookup failed");
                        return None;
                    }
                }
            }
        };

        Some(match raw.sort {
            Some(sort) => request.with_sort(sort),
            None => request,
        })
    }
}
