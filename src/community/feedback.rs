//! Community feedback board, stored under `communityFeedback`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::community::error::CommunityError;
use crate::community::storage::{get_json, set_json, KeyValueStore};

pub const FEEDBACK_KEY: &str = "communityFeedback";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Entries written before ids existed get a fresh one on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

pub struct FeedbackBoard {
    store: Arc<dyn KeyValueStore>,
    /// Oldest first, as stored.
    entries: Vec<FeedbackEntry>,
}

impl FeedbackBoard {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match get_json::<Vec<FeedbackEntry>>(store.as_ref(), FEEDBACK_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable feedback entries");
                Vec::new()
            }
        };
        Self { store, entries }
    }

    /// Append `text` as typed. Blank text is ignored and returns `None`.
    pub fn submit(&mut self, text: &str) -> Result<Option<FeedbackEntry>, CommunityError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let entry = FeedbackEntry {
            id: Uuid::new_v4(),
            text: text.to_string(),
            timestamp: Utc::now(),
        };

        let mut entries = self.entries.clone();
        entries.push(entry.clone());
        set_json(self.store.as_ref(), FEEDBACK_KEY, &entries)?;
        self.entries = entries;

        tracing::debug!(id = %entry.id, "Feedback stored");
        Ok(Some(entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &FeedbackEntry> {
        self.entries.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::storage::MemoryStore;

    #[test]
    fn test_blank_feedback_is_ignored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut board = FeedbackBoard::load(store.clone());
        assert!(board.submit("   \n\t").unwrap().is_none());
        assert!(board.is_empty());
        assert!(store.get(FEEDBACK_KEY).is_none());
    }

    #[test]
    fn test_entries_listed_newest_first() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut board = FeedbackBoard::load(store.clone());
        board.submit("first").unwrap();
        board.submit("  second  ").unwrap();

        let texts: Vec<_> = board.newest_first().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["  second  ", "first"]);

        let reloaded = FeedbackBoard::load(store);
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_loads_entries_without_ids() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store
            .set(
                FEEDBACK_KEY,
                r#"[{"text":"Great token!","timestamp":"2025-01-15T10:30:00.000Z"}]"#.into(),
            )
            .unwrap();
        let board = FeedbackBoard::load(store);
        let entry = board.newest_first().next().unwrap();
        assert_eq!(entry.text, "Great token!");
        assert_eq!(entry.timestamp.to_rfc3339(), "2025-01-15T10:30:00+00:00");
    }
}
