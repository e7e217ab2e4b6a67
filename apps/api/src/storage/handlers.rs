use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::chat::ChatRequest;
use crate::models::feedback::FeedbackEntry;
use crate::models::session::{Session, SessionCreate, SessionUpdate};
use crate::state::AppState;

/// POST /api/feedback
/// The feedback text arrives in `query`, matching the chat request shape.
pub async fn handle_submit_feedback(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    req.validate()?;
    state
        .feedback
        .save_feedback(&req.session_id, req.query.trim(), req.contact_info)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Feedback submitted successfully"
    })))
}

/// GET /api/feedback/:session_id
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<FeedbackEntry>>, AppError> {
    let entries = state.feedback.get_feedback(&session_id).await?;
    if entries.is_empty() {
        return Err(AppError::NotFound("Feedback not found".to_string()));
    }
    Ok(Json(entries))
}

/// GET /api/sessions/:session_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, AppError> {
    state
        .sessions
        .get_session(&session_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
}

/// POST /api/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<SessionCreate>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    if req.session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id cannot be empty".to_string()));
    }
    let session = state.sessions.create_session(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// PUT /api/sessions/:session_id
pub async fn handle_update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SessionUpdate>,
) -> Result<Json<Session>, AppError> {
    state
        .sessions
        .update_session(&session_id, req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
}
