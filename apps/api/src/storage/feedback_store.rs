use std::path::Path;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::models::feedback::FeedbackEntry;
use crate::storage::{JsonFile, StorageError};

const FEEDBACK_FILE: &str = "feedback.json";

/// Append-only feedback log kept as one JSON array in `feedback.json`.
pub struct FeedbackStore {
    file: JsonFile<Vec<FeedbackEntry>>,
    write_lock: Mutex<()>,
}

impl FeedbackStore {
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            file: JsonFile::open(dir.join(FEEDBACK_FILE))?,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn save_feedback(
        &self,
        session_id: &str,
        feedback: &str,
        contact_info: Option<String>,
    ) -> Result<FeedbackEntry, StorageError> {
        let entry = FeedbackEntry {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            feedback: feedback.to_string(),
            contact_info,
            timestamp: Utc::now(),
        };

        let _guard = self.write_lock.lock().await;
        let mut all = self.file.load().await?;
        all.push(entry.clone());
        self.file.persist(all).await?;

        info!("Stored feedback {} for session {}", entry.id, session_id);
        Ok(entry)
    }

    /// All feedback recorded for `session_id`, oldest first.
    pub async fn get_feedback(&self, session_id: &str) -> Result<Vec<FeedbackEntry>, StorageError> {
        let _guard = self.write_lock.lock().await;
        Ok(self
            .file
            .load()
            .await?
            .into_iter()
            .filter(|f| f.session_id == session_id)
            .collect())
    }
}
