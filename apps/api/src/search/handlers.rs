use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub response: String,
}

/// POST /api/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let client = state
        .search
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Web search is not configured".to_string()))?;
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    Ok(Json(SearchResponse {
        response: client.search(req.query.trim()).await,
    }))
}
