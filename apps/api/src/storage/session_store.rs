use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::models::session::{Session, SessionCreate, SessionUpdate, Turn};
use crate::storage::{JsonFile, StorageError};

const SESSIONS_FILE: &str = "sessions.json";

type SessionMap = BTreeMap<String, Session>;

/// Sessions keyed by id, mirrored in memory and rewritten to `sessions.json` on change.
pub struct SessionStore {
    file: JsonFile<SessionMap>,
    sessions: Mutex<SessionMap>,
    timeout: Duration,
}

impl SessionStore {
    pub fn open(dir: &Path, timeout_minutes: i64) -> Result<Self, StorageError> {
        let file = JsonFile::open(dir.join(SESSIONS_FILE))?;
        let sessions = file.read().unwrap_or_else(|e| {
            error!("Error loading sessions: {e}");
            SessionMap::new()
        });
        info!("Loaded {} session(s) from {}", sessions.len(), file.path().display());

        Ok(Self {
            file,
            sessions: Mutex::new(sessions),
            timeout: Duration::minutes(timeout_minutes),
        })
    }

    pub async fn create_session(&self, create: SessionCreate) -> Result<Session, StorageError> {
        let now = Utc::now();
        let session = Session {
            session_id: create.session_id.clone(),
            created_at: now,
            last_accessed: now,
            context: create.context,
        };

        let mut sessions = self.sessions.lock().await;
        let mut next = sessions.clone();
        next.insert(create.session_id, session.clone());
        self.commit(&mut sessions, next).await?;
        Ok(session)
    }

    /// Returns the session if it exists and has not expired. Expired sessions
    /// are purged first.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        let mut sessions = self.sessions.lock().await;
        self.purge_expired(&mut sessions, Utc::now()).await?;
        Ok(sessions.get(session_id).cloned())
    }

    /// Replaces `last_accessed` and `context`. Returns `None` for unknown sessions.
    pub async fn update_session(
        &self,
        session_id: &str,
        update: SessionUpdate,
    ) -> Result<Option<Session>, StorageError> {
        let mut sessions = self.sessions.lock().await;
        let mut next = sessions.clone();
        let Some(session) = next.get_mut(session_id) else {
            return Ok(None);
        };
        session.last_accessed = update.last_accessed;
        session.context = update.context;
        let updated = session.clone();

        self.commit(&mut sessions, next).await?;
        Ok(Some(updated))
    }

    /// Records one exchange, creating the session on first contact.
    pub async fn append_turn(&self, session_id: &str, turn: Turn) -> Result<Session, StorageError> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let mut next = sessions.clone();
        let session = next
            .entry(session_id.to_string())
            .or_insert_with(|| Session {
                session_id: session_id.to_string(),
                created_at: now,
                last_accessed: now,
                context: Default::default(),
            });
        session.push_turn(turn);
        session.last_accessed = now;
        let updated = session.clone();

        self.commit(&mut sessions, next).await?;
        Ok(updated)
    }

    /// The last `n` turns of a live session, oldest first.
    pub async fn recent_history(&self, session_id: &str, n: usize) -> Result<Vec<Turn>, StorageError> {
        let history = self
            .get_session(session_id)
            .await?
            .map(|s| s.history())
            .unwrap_or_default();
        let skip = history.len().saturating_sub(n);
        Ok(history.into_iter().skip(skip).collect())
    }

    async fn purge_expired(
        &self,
        sessions: &mut SessionMap,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let cutoff = now - self.timeout;
        let mut next = sessions.clone();
        next.retain(|_, s| s.last_accessed >= cutoff);
        let purged = sessions.len() - next.len();

        if purged > 0 {
            self.commit(sessions, next).await?;
            info!("Cleaned up {purged} expired session(s)");
        }
        Ok(())
    }

    /// Writes `next` to disk, and only then makes it the in-memory state.
    async fn commit(&self, sessions: &mut SessionMap, next: SessionMap) -> Result<(), StorageError> {
        *sessions = self.file.persist(next).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::SessionContext;

    fn turn(q: &str, r: &str) -> Turn {
        Turn {
            query: q.to_string(),
            response: r.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path(), 30).unwrap();

        store
            .create_session(SessionCreate {
                session_id: "s1".to_string(),
                context: SessionContext::new(),
            })
            .await
            .unwrap();

        let session = store.get_session("s1").await.unwrap().unwrap();
        assert_eq!(session.session_id, "s1");
        assert!(store.get_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_session_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path(), 30).unwrap();

        let updated = store
            .update_session(
                "ghost",
                SessionUpdate {
                    last_accessed: Utc::now(),
                    context: SessionContext::new(),
                },
            )
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_purged_on_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path(), 30).unwrap();

        store.append_turn("stale", turn("hi", "hello")).await.unwrap();
        store.append_turn("fresh", turn("hi", "hello")).await.unwrap();
        store
            .update_session(
                "stale",
                SessionUpdate {
                    last_accessed: Utc::now() - Duration::minutes(31),
                    context: SessionContext::new(),
                },
            )
            .await
            .unwrap();

        assert!(store.get_session("stale").await.unwrap().is_none());
        assert!(store.get_session("fresh").await.unwrap().is_some());

        let reopened = SessionStore::open(dir.path(), 30).unwrap();
        let on_disk = reopened.sessions.lock().await;
        assert!(!on_disk.contains_key("stale"));
    }

    #[tokio::test]
    async fn test_append_turn_creates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SessionStore::open(dir.path(), 30).unwrap();
            store.append_turn("s1", turn("q1", "r1")).await.unwrap();
            store.append_turn("s1", turn("q2", "r2")).await.unwrap();
        }

        let store = SessionStore::open(dir.path(), 30).unwrap();
        let session = store.get_session("s1").await.unwrap().unwrap();
        assert_eq!(session.history(), vec![turn("q1", "r1"), turn("q2", "r2")]);
    }

    #[tokio::test]
    async fn test_recent_history_keeps_last_n_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path(), 30).unwrap();
        for i in 1..=5 {
            store
                .append_turn("s1", turn(&format!("q{i}"), &format!("r{i}")))
                .await
                .unwrap();
        }

        let recent = store.recent_history("s1", 2).await.unwrap();
        assert_eq!(recent, vec![turn("q4", "r4"), turn("q5", "r5")]);
        assert!(store.recent_history("nobody", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSIONS_FILE), "{broken").unwrap();

        let store = SessionStore::open(dir.path(), 30).unwrap();
        assert!(store.get_session("any").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_sessions_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path(), 30).unwrap();
        store.append_turn("kept", turn("q1", "r1")).await.unwrap();

        let path = dir.path().join(SESSIONS_FILE);
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let created = store
            .create_session(SessionCreate {
                session_id: "s1".to_string(),
                context: SessionContext::new(),
            })
            .await;
        assert!(created.is_err());
        assert!(store.get_session("s1").await.unwrap().is_none());

        assert!(store.append_turn("kept", turn("q2", "r2")).await.is_err());
        let update = SessionUpdate {
            last_accessed: Utc::now(),
            context: SessionContext::new(),
        };
        assert!(store.update_session("kept", update).await.is_err());

        let kept = store.get_session("kept").await.unwrap().unwrap();
        assert_eq!(kept.history(), vec![turn("q1", "r1")]);
    }
}
