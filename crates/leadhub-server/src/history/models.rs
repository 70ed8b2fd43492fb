//! History data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// What happened to the buyer record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    StatusChanged,
    NoteAdded,
    Imported,
    Deleted,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::NoteAdded => "note_added",
            Self::Imported => "imported",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored history entry
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub changed_by: Uuid,
    pub action: String,
    pub diff: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

/// A history entry waiting to be written
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub buyer_id: Uuid,
    pub changed_by: Uuid,
    pub action: HistoryAction,
    pub diff: Option<JsonValue>,
}

impl NewHistoryEntry {
    pub fn new(buyer_id: Uuid, changed_by: Uuid, action: HistoryAction) -> Self {
        Self {
            buyer_id,
            changed_by,
            action,
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: JsonValue) -> Self {
        self.diff = Some(diff);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_strings() {
        assert_eq!(HistoryAction::Created.as_str(), "created");
        assert_eq!(HistoryAction::StatusChanged.as_str(), "status_changed");
        assert_eq!(HistoryAction::Deleted.to_string(), "deleted");
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let value = serde_json::to_value(HistoryAction::NoteAdded).unwrap();
        assert_eq!(value, json!("note_added"));
    }

    #[test]
    fn test_builder_attaches_diff() {
        let entry = NewHistoryEntry::new(Uuid::new_v4(), Uuid::new_v4(), HistoryAction::Updated)
            .with_diff(json!({"status": {"from": "New", "to": "Qualified"}}));
        assert!(entry.diff.is_some());
    }
}
