use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use taskboard_common::{Board, MoveTask, NewTask, TaskPatch};
use tracing::debug;

use super::hub::SyncHub;
use crate::errors::SyncError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub hub: SyncHub,
}

impl AppState {
    pub fn new(board: Board, broadcast_capacity: usize) -> Self {
        Self {
            hub: SyncHub::new(board, broadcast_capacity),
        }
    }
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

/// Body of `POST /api/tasks/{id}/move`; the task id comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    pub from_column_id: String,
    pub from_index: usize,
    pub to_column_id: String,
    pub to_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveTaskResponse {
    pub moved: bool,
    pub board: Board,
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Board(e) if e.is_not_found() => {
                debug!(error = %e, "request referenced a missing task or column");
                ApiError::NotFound(e.to_string())
            }
            SyncError::Board(e) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/board", get(get_board))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/tasks/{id}/move", post(move_task))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_board(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let board = state.hub.snapshot()?;
    Ok(Json(board))
}

async fn create_task(
    State(state): State<SharedState>,
    Json(req): Json<NewTask>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".into()));
    }
    let task = state.hub.mutate(move |store| store.create_task(req))?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<impl IntoResponse, ApiError> {
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title must not be empty".into()));
    }
    let task = state.hub.mutate(|store| store.update_task(&id, patch))?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.hub.mutate(|store| store.delete_task(&id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mv = MoveTask {
        task_id: id,
        from_column_id: req.from_column_id,
        from_index: req.from_index,
        to_column_id: req.to_column_id,
        to_index: req.to_index,
    };
    let (moved, board) = state.hub.mutate_when(
        |store| {
            let moved = store.move_task(&mv)?;
            Ok((moved, store.snapshot()))
        },
        |(moved, _)| *moved,
    )?;
    Ok(Json(MoveTaskResponse { moved, board }))
}
