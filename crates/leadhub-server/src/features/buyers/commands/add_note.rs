//! Add note command
//!
//! Notes accumulate newest-first: each note is prepended to the stored
//! text as `[timestamp] note` followed by a blank line.

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::features::buyers::types::{BuyerRecord, BuyerResponse, BUYER_COLUMNS};
use crate::features::buyers::{fetch_buyer_authorized, BuyerAccessError};
use crate::history::{self, HistoryAction, NewHistoryEntry};

/// Maximum length of a single note
pub const NOTE_MAX_LENGTH: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct AddNoteCommand {
    pub note: String,
}

impl AddNoteCommand {
    pub fn validate(&self) -> Result<(), AddNoteError> {
        let note = self.note.trim();
        if note.is_empty() {
            return Err(AddNoteError::Validation("Note cannot be empty".to_string()));
        }
        if note.chars().count() > NOTE_MAX_LENGTH {
            return Err(AddNoteError::Validation(format!(
                "Note cannot exceed {} characters",
                NOTE_MAX_LENGTH
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AddNoteError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Access(#[from] BuyerAccessError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Prepend a timestamped note to the existing notes text
fn prepend_note(existing: &str, note: &str, timestamp: &str) -> String {
    let entry = format!("[{}] {}", timestamp, note);
    if existing.trim().is_empty() {
        entry
    } else {
        format!("{}\n\n{}", entry, existing)
    }
}

/// Handle note addition
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    buyer_id: Uuid,
    command: AddNoteCommand,
) -> Result<BuyerResponse, AddNoteError> {
    let record = fetch_buyer_authorized(&pool, user, buyer_id).await?;
    command.validate()?;

    let note = command.note.trim();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let notes = prepend_note(&record.notes, note, &timestamp);

    let after = sqlx::query_as::<_, BuyerRecord>(&format!(
        "UPDATE buyers SET notes = $1, updated_at = now() WHERE id = $2 RETURNING {}",
        BUYER_COLUMNS
    ))
    .bind(&notes)
    .bind(buyer_id)
    .fetch_one(&pool)
    .await?;

    history::record(
        &pool,
        NewHistoryEntry::new(buyer_id, user.id, HistoryAction::NoteAdded)
            .with_diff(json!({ "note": note })),
    )
    .await;

    tracing::info!(buyer_id = %buyer_id, user_id = %user.id, "Added note to buyer");

    Ok(BuyerResponse::from(after))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_note_rejected() {
        let command = AddNoteCommand {
            note: "   ".to_string(),
        };
        assert!(matches!(
            command.validate(),
            Err(AddNoteError::Validation(_))
        ));
    }

    #[test]
    fn test_oversized_note_rejected() {
        let command = AddNoteCommand {
            note: "x".repeat(NOTE_MAX_LENGTH + 1),
        };
        assert!(command.validate().is_err());
    }

    #[test]
    fn test_prepend_to_empty_notes() {
        let result = prepend_note("", "Called, asked for site visit", "2025-01-15T10:30:00Z");
        assert_eq!(result, "[2025-01-15T10:30:00Z] Called, asked for site visit");
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let existing = "[2025-01-10T09:00:00Z] First contact";
        let result = prepend_note(existing, "Follow-up call", "2025-01-15T10:30:00Z");
        assert_eq!(
            result,
            "[2025-01-15T10:30:00Z] Follow-up call\n\n[2025-01-10T09:00:00Z] First contact"
        );
    }
}
