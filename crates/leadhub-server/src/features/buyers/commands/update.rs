//! Update buyer command

use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::features::buyers::types::{
    join_tags, Bhk, BuyerRecord, BuyerResponse, City, LeadSource, LeadStatus, PropertyType,
    Purpose, Timeline, BUYER_COLUMNS,
};
use crate::features::buyers::{fetch_buyer_authorized, BuyerAccessError};
use crate::features::shared::validation::{
    validate_budget, validate_email, validate_full_name, validate_phone,
};
use crate::history::{self, HistoryAction, NewHistoryEntry};

/// Full-record update; every mutable field is supplied
#[derive(Debug, Deserialize)]
pub struct UpdateBuyerCommand {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: City,
    pub property_type: PropertyType,
    pub bhk: Option<Bhk>,
    pub purpose: Purpose,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: Timeline,
    pub source: LeadSource,
    pub status: LeadStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl UpdateBuyerCommand {
    pub fn validate(&self) -> Result<(), UpdateBuyerError> {
        validate_full_name(&self.full_name)
            .map_err(|e| UpdateBuyerError::Validation(e.to_string()))?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate_email(email).map_err(|e| UpdateBuyerError::Validation(e.to_string()))?;
        }
        validate_phone(&self.phone).map_err(|e| UpdateBuyerError::Validation(e.to_string()))?;
        validate_budget(self.budget_min, self.budget_max)
            .map_err(|e| UpdateBuyerError::Validation(e.to_string()))?;
        if self.property_type.is_residential() && self.bhk.is_none() {
            return Err(UpdateBuyerError::Validation(
                "BHK is required for Apartment and Villa leads".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum UpdateBuyerError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Access(#[from] BuyerAccessError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Per-field diff between the stored record and its replacement
fn field_changes(before: &BuyerRecord, after: &BuyerRecord) -> JsonValue {
    let mut changes = Map::new();
    let mut push = |field: &str, from: JsonValue, to: JsonValue| {
        if from != to {
            changes.insert(field.to_string(), json!({ "from": from, "to": to }));
        }
    };

    push("full_name", json!(before.full_name), json!(after.full_name));
    push("email", json!(before.email), json!(after.email));
    push("phone", json!(before.phone), json!(after.phone));
    push("city", json!(before.city), json!(after.city));
    push(
        "property_type",
        json!(before.property_type),
        json!(after.property_type),
    );
    push("bhk", json!(before.bhk), json!(after.bhk));
    push("purpose", json!(before.purpose), json!(after.purpose));
    push(
        "budget_min",
        json!(before.budget_min),
        json!(after.budget_min),
    );
    push(
        "budget_max",
        json!(before.budget_max),
        json!(after.budget_max),
    );
    push("timeline", json!(before.timeline), json!(after.timeline));
    push("source", json!(before.source), json!(after.source));
    push("status", json!(before.status), json!(after.status));
    push("tags", json!(before.tags), json!(after.tags));
    push("notes", json!(before.notes), json!(after.notes));

    JsonValue::Object(changes)
}

/// History entry for an accepted update
///
/// Always produced, even when nothing changed; the diff is then an empty
/// object.
fn update_entry(
    buyer_id: Uuid,
    changed_by: Uuid,
    before: &BuyerRecord,
    after: &BuyerRecord,
) -> NewHistoryEntry {
    NewHistoryEntry::new(buyer_id, changed_by, HistoryAction::Updated)
        .with_diff(field_changes(before, after))
}

/// Handle a full buyer update
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    buyer_id: Uuid,
    command: UpdateBuyerCommand,
) -> Result<BuyerResponse, UpdateBuyerError> {
    let before = fetch_buyer_authorized(&pool, user, buyer_id).await?;
    command.validate()?;

    let email = command
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let after = sqlx::query_as::<_, BuyerRecord>(&format!(
        r#"
        UPDATE buyers SET
            full_name = $1, email = $2, phone = $3, city = $4,
            property_type = $5, bhk = $6, purpose = $7,
            budget_min = $8, budget_max = $9, timeline = $10,
            source = $11, status = $12, tags = $13, notes = $14,
            updated_at = now()
        WHERE id = $15
        RETURNING {}
        "#,
        BUYER_COLUMNS
    ))
    .bind(command.full_name.trim())
    .bind(email)
    .bind(command.phone.trim())
    .bind(command.city.as_str())
    .bind(command.property_type.as_str())
    .bind(command.bhk.map(|b| b.as_str()))
    .bind(command.purpose.as_str())
    .bind(command.budget_min)
    .bind(command.budget_max)
    .bind(command.timeline.as_str())
    .bind(command.source.as_str())
    .bind(command.status.as_str())
    .bind(join_tags(&command.tags))
    .bind(command.notes.trim())
    .bind(buyer_id)
    .fetch_one(&pool)
    .await?;

    history::record(&pool, update_entry(buyer_id, user.id, &before, &after)).await;

    tracing::info!(buyer_id = %buyer_id, user_id = %user.id, "Updated buyer lead");

    Ok(BuyerResponse::from(after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> BuyerRecord {
        BuyerRecord {
            id: Uuid::new_v4(),
            full_name: "Priya Sharma".to_string(),
            email: None,
            phone: "9876543210".to_string(),
            city: "Chandigarh".to_string(),
            property_type: "Apartment".to_string(),
            bhk: Some("2".to_string()),
            purpose: "Buy".to_string(),
            budget_min: Some(5_000_000),
            budget_max: Some(7_000_000),
            timeline: "0-3m".to_string(),
            source: "Website".to_string(),
            status: "New".to_string(),
            tags: "hot".to_string(),
            notes: String::new(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_field_changes_captures_only_differences() {
        let before = record();
        let mut after = before.clone();
        after.status = "Qualified".to_string();
        after.budget_max = Some(8_000_000);

        let diff = field_changes(&before, &after);
        let map = diff.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["status"]["from"], "New");
        assert_eq!(map["status"]["to"], "Qualified");
        assert_eq!(map["budget_max"]["to"], 8_000_000);
    }

    #[test]
    fn test_identical_records_produce_empty_diff() {
        let before = record();
        let diff = field_changes(&before, &before.clone());
        assert!(diff.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_no_change_update_still_yields_history_entry() {
        let before = record();
        let user_id = Uuid::new_v4();
        let entry = update_entry(before.id, user_id, &before, &before.clone());

        assert_eq!(entry.buyer_id, before.id);
        assert_eq!(entry.changed_by, user_id);
        assert_eq!(entry.action, HistoryAction::Updated);
        // One row per accepted mutation, even a no-op; the diff just says so
        assert_eq!(entry.diff, Some(serde_json::json!({})));
    }

    #[test]
    fn test_update_validation() {
        let command = UpdateBuyerCommand {
            full_name: "Priya Sharma".to_string(),
            email: None,
            phone: "9876543210".to_string(),
            city: City::Mohali,
            property_type: PropertyType::Villa,
            bhk: None,
            purpose: Purpose::Buy,
            budget_min: None,
            budget_max: None,
            timeline: Timeline::Exploring,
            source: LeadSource::Referral,
            status: LeadStatus::Qualified,
            tags: vec![],
            notes: String::new(),
        };
        // Villa without BHK
        assert!(command.validate().is_err());
    }
}
