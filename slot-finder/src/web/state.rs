//! Application state for the web layer.

use std::sync::Arc;

use crate::directory::AreaDirectory;
use crate::session::SearchSession;
use crate::source::LocationSource;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
pub struct AppState<D, S> {
    /// Area directory, for listing departments
    pub directory: Arc<D>,

    /// The search session driven by the API
    pub session: Arc<SearchSession<D, S>>,
}

impl<D, S> Clone for AppState<D, S> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            session: Arc::clone(&self.session),
        }
    }
}

impl<D: AreaDirectory, S: LocationSource> AppState<D, S> {
    /// Create a new app state.
    pub fn new(directory: Arc<D>, session: SearchSession<D, S>) -> Self {
        Self {
            directory,
            session: Arc::new(session),
        }
    }
}
