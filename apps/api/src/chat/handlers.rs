use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::chat::{ChatRequest, ChatResponse};
use crate::state::AppState;

/// POST /api/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = state.pipeline.process_message(&req).await?;
    Ok(Json(response))
}

/// POST /api/jobs/naukri
pub async fn handle_naukri_jobs(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = state.pipeline.process_naukri(&req).await?;
    Ok(Json(response))
}
