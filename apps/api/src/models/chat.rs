use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Body of `POST /api/chat`, `POST /api/jobs/naukri` and `POST /api/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub query: String,
    #[serde(default)]
    pub contact_info: Option<String>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.session_id.trim().is_empty() {
            return Err(AppError::Validation("session_id cannot be empty".to_string()));
        }
        if self.query.trim().is_empty() {
            return Err(AppError::Validation("query cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            session_id: session_id.into(),
            timestamp: Utc::now(),
        }
    }
}
