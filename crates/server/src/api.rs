//! HTTP API: thin axum layer over `LeaderboardStore`

use crate::cors::cors_layer;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use engine::{ImportedEntry, LeaderboardError, LeaderboardStore, ScoreEntry};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const MISSING_FIELDS: &str = "Name and score are required.";

#[derive(Clone)]
pub struct AppState {
    pub leaderboard: Arc<LeaderboardStore>,
    pub allow_replace: bool,
}

/// Error type returned by the handlers. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Replacing the whole leaderboard is disabled.")]
    ReplaceDisabled,
    #[error("The leaderboard is busy, please try again.")]
    Conflict,
    /// Client-facing message; the cause is logged by the engine
    #[error("{0}")]
    Storage(&'static str),
}

impl ApiError {
    fn from_leaderboard(err: LeaderboardError, storage_message: &'static str) -> Self {
        match err {
            LeaderboardError::InvalidInput(message) => Self::BadRequest(message),
            LeaderboardError::Conflict { attempts } => {
                warn!(attempts, "Giving up on contended leaderboard update");
                Self::Conflict
            }
            LeaderboardError::StorageUnavailable(_) => Self::Storage(storage_message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ReplaceDisabled => StatusCode::FORBIDDEN,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Build the full application: API routes, optional static files, CORS
pub fn app(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/api", get(api_get_leaderboard).post(api_submit_score))
        .route("/api/health", get(api_health))
        .route("/api/update-leaderboard", post(api_replace_leaderboard))
        .with_state(state);

    if let Some(dir) = static_dir.filter(|dir| dir.is_dir()) {
        info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(from_fn(cors_layer))
}

/// Body of POST /api
#[derive(Debug, Deserialize)]
struct SubmitRequest {
    name: Option<String>,
    score: Option<f64>,
}

/// GET /api/health
async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "leaderboard-server",
        "version": APP_VERSION,
    }))
}

/// GET /api: current ranked leaderboard
async fn api_get_leaderboard(State(state): State<AppState>) -> Result<Response, ApiError> {
    let (board, etag) = state
        .leaderboard
        .get_top_versioned()
        .await
        .map_err(|e| ApiError::from_leaderboard(e, "Failed to fetch leaderboard data."))?;

    let mut res = Json(board).into_response();
    if let Some(value) = etag.and_then(|tag| HeaderValue::from_str(&format!("\"{}\"", tag)).ok())
    {
        res.headers_mut().insert(header::ETAG, value);
    }
    Ok(res)
}

/// POST /api: submit `{name, score}`, returns the updated leaderboard
async fn api_submit_score(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<Vec<ScoreEntry>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejected submission body: {}", rejection.body_text());
        ApiError::BadRequest(MISSING_FIELDS.to_string())
    })?;

    let (Some(name), Some(score)) = (request.name, request.score) else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    };

    let board = state
        .leaderboard
        .submit(&name, score)
        .await
        .map_err(|e| ApiError::from_leaderboard(e, "Failed to update leaderboard."))?;

    Ok(Json(board))
}

/// POST /api/update-leaderboard: overwrite the whole leaderboard
async fn api_replace_leaderboard(
    State(state): State<AppState>,
    payload: Result<Json<Vec<ImportedEntry>>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.allow_replace {
        return Err(ApiError::ReplaceDisabled);
    }

    let Json(entries) = payload.map_err(|rejection| {
        debug!("Rejected leaderboard body: {}", rejection.body_text());
        ApiError::BadRequest("No leaderboard data provided.".to_string())
    })?;

    let board = state
        .leaderboard
        .replace(entries)
        .await
        .map_err(|e| ApiError::from_leaderboard(e, "Failed to upload leaderboard."))?;

    Ok(Json(serde_json::json!({
        "message": "Leaderboard updated successfully!",
        "leaderboard": board,
    })))
}
