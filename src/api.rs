// HTTP façade - REST routes over the CSV store plus the static client
//
// GET  /api/competitors  -> every record as a JSON array
// POST /api/competitors  -> append one record, 201 with the created record
// GET  /                 -> public/index.html, other assets from public/

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::config::Config;
use crate::error::Error;
use crate::record::{Competitor, NewCompetitor, Record, REQUIRED_FIELDS_MESSAGE};
use crate::store::CsvStore;

pub const NOT_FOUND_MESSAGE: &str = "Competitors file not found.";
pub const READ_FAILED_MESSAGE: &str = "Error reading competitors file.";
pub const SAVE_FAILED_MESSAGE: &str = "Error saving new competitor.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: CsvStore,
}

impl AppState {
    pub fn new(store: CsvStore) -> Self {
        Self { store }
    }
}

/// Body of every error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: &'static str,
}

/// A failed request: status code plus the fixed client-facing message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    /// Map a failure of the list operation.
    fn listing(err: Error) -> Self {
        match err {
            Error::NotFound { path } => {
                warn!(path = %path.display(), "Competitors file not found");
                Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
            }
            other => {
                error!(error = %other, "Error reading competitors file");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, READ_FAILED_MESSAGE)
            }
        }
    }

    /// Map a failure of the create operation.
    fn saving(err: Error) -> Self {
        match err {
            Error::Validation { message } => {
                warn!(%message, "Rejected new competitor");
                Self::bad_request()
            }
            other => {
                error!(error = %other, "Error saving new competitor");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED_MESSAGE)
            }
        }
    }

    fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, REQUIRED_FIELDS_MESSAGE)
    }

    fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/competitors - List all competitors
async fn list_competitors(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    let store = state.store.clone();

    let records = tokio::task::spawn_blocking(move || store.read_all())
        .await
        .map_err(|e| {
            error!(error = %e, "Read task failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, READ_FAILED_MESSAGE)
        })?
        .map_err(ApiError::listing)?;

    Ok(Json(records))
}

/// POST /api/competitors - Append a new competitor
async fn create_competitor(
    State(state): State<AppState>,
    payload: Result<Json<NewCompetitor>, JsonRejection>,
) -> Result<(StatusCode, Json<Competitor>), ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Unreadable competitor payload");
        ApiError::bad_request()
    })?;

    let store = state.store.clone();

    let competitor = tokio::task::spawn_blocking(move || store.create(input))
        .await
        .map_err(|e| {
            error!(error = %e, "Write task failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED_MESSAGE)
        })?
        .map_err(ApiError::saving)?;

    Ok((StatusCode::CREATED, Json(competitor)))
}

// ============================================================================
// Router
// ============================================================================

/// Build the full application: API routes, static client, CORS, tracing.
pub fn router(config: &Config) -> Router {
    let state = AppState::new(CsvStore::new(config.csv_path.clone()));

    let api_routes = Router::new()
        .route("/competitors", get(list_competitors).post(create_competitor))
        .with_state(state);

    Router::new()
        .route_service("/", ServeFile::new(config.public_dir.join("index.html")))
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
