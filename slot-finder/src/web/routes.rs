//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::directory::{AreaDirectory, DirectoryError};
use crate::domain::{DomainError, SearchRequest};
use crate::session::RefreshError;
use crate::source::LocationSource;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<D: AreaDirectory, S: LocationSource>(state: AppState<D, S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/departments", get(list_departments::<D, S>))
        .route("/api/search", get(current_search::<D, S>))
        .route("/api/results", get(results::<D, S>))
        .route("/api/status", get(status::<D, S>))
        .route("/api/selection", post(update_selection::<D, S>))
        .route("/api/refresh", post(refresh::<D, S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Departments offered by the search widget.
async fn list_departments<D: AreaDirectory, S: LocationSource>(
    State(state): State<AppState<D, S>>,
) -> Result<Json<Vec<DepartmentResult>>, AppError> {
    let departments = state.directory.list_departments().await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

/// The resolved search, or `null`.
async fn current_search<D: AreaDirectory, S: LocationSource>(
    State(state): State<AppState<D, S>>,
) -> Json<Option<SearchRequest>> {
    Json(state.session.current_search())
}

/// The displayed result, flagged as pending when it predates the current search.
async fn results<D: AreaDirectory, S: LocationSource>(
    State(state): State<AppState<D, S>>,
) -> Result<Json<ResultsResponse>, AppError> {
    let Some(result) = state.session.displayed() else {
        return Err(AppError::NotFound {
            message: "No results yet".to_string(),
        });
    };

    let current = state.session.current_search();
    Ok(Json(ResultsResponse::new(&result, current.as_ref())))
}

/// Search progress and freshness signals.
async fn status<D: AreaDirectory, S: LocationSource>(
    State(state): State<AppState<D, S>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        search_in_progress: state.session.search_in_progress(),
        update_available: state.session.update_available(),
        last_checked: state.session.last_checked(),
    })
}

/// Apply raw selection changes. Resolution happens in the background.
async fn update_selection<D: AreaDirectory, S: LocationSource>(
    State(state): State<AppState<D, S>>,
    Json(req): Json<SelectionRequest>,
) -> Result<StatusCode, AppError> {
    let update = req.into_update()?;
    // Completion is observed through /api/search and /api/results.
    drop(state.session.apply(update));
    Ok(StatusCode::ACCEPTED)
}

/// Re-run the current search and resume watching for updates.
async fn refresh<D: AreaDirectory, S: LocationSource>(
    State(state): State<AppState<D, S>>,
) -> Result<Json<ResultsResponse>, AppError> {
    let Some(result) = state.session.apply_update().await? else {
        return Err(AppError::NotFound {
            message: "No active search".to_string(),
        });
    };

    let current = state.session.current_search();
    Ok(Json(ResultsResponse::new(&result, current.as_ref())))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<RefreshError> for AppError {
    fn from(e: RefreshError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
