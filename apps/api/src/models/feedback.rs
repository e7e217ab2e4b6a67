use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub session_id: String,
    pub feedback: String,
    pub contact_info: Option<String>,
    pub timestamp: DateTime<Utc>,
}
