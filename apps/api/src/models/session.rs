use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key under which conversation turns are kept in a session's context.
pub const HISTORY_KEY: &str = "history";

/// Free-form per-session context: named lists of string records.
pub type SessionContext = BTreeMap<String, Vec<BTreeMap<String, String>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    #[serde(default)]
    pub context: SessionContext,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionCreate {
    pub session_id: String,
    #[serde(default)]
    pub context: SessionContext,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUpdate {
    pub last_accessed: DateTime<Utc>,
    pub context: SessionContext,
}

/// One query/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub query: String,
    pub response: String,
}

impl Turn {
    fn into_record(self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("query".to_string(), self.query),
            ("response".to_string(), self.response),
        ])
    }

    fn from_record(record: &BTreeMap<String, String>) -> Option<Self> {
        Some(Self {
            query: record.get("query")?.clone(),
            response: record.get("response")?.clone(),
        })
    }
}

impl Session {
    pub fn history(&self) -> Vec<Turn> {
        self.context
            .get(HISTORY_KEY)
            .map(|records| records.iter().filter_map(Turn::from_record).collect())
            .unwrap_or_default()
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.context
            .entry(HISTORY_KEY.to_string())
            .or_default()
            .push(turn.into_record());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_skips_malformed_records() {
        let now = Utc::now();
        let mut session = Session {
            session_id: "s1".to_string(),
            created_at: now,
            last_accessed: now,
            context: SessionContext::new(),
        };
        session.push_turn(Turn {
            query: "jobs?".to_string(),
            response: "Here are some jobs".to_string(),
        });
        session
            .context
            .get_mut(HISTORY_KEY)
            .unwrap()
            .push(BTreeMap::from([("query".to_string(), "orphan".to_string())]));

        let history = session.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "jobs?");
    }

    #[test]
    fn test_session_without_context_deserializes() {
        let json = r#"{
            "session_id": "abc",
            "created_at": "2025-01-01T10:00:00Z",
            "last_accessed": "2025-01-01T10:05:00Z"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.context.is_empty());
        assert!(session.history().is_empty());
    }
}
