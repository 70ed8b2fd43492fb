//! Create buyer command

use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::CurrentUser;
use crate::features::buyers::types::{
    join_tags, Bhk, BuyerRecord, BuyerResponse, City, LeadSource, LeadStatus, PropertyType,
    Purpose, Timeline, BUYER_COLUMNS,
};
use crate::features::shared::validation::{
    validate_budget, validate_email, validate_full_name, validate_phone,
};
use crate::history::{self, HistoryAction, NewHistoryEntry};

/// Command to create a new buyer lead
#[derive(Debug, Deserialize)]
pub struct CreateBuyerCommand {
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
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl CreateBuyerCommand {
    pub fn validate(&self) -> Result<(), CreateBuyerError> {
        validate_full_name(&self.full_name)
            .map_err(|e| CreateBuyerError::Validation(e.to_string()))?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate_email(email).map_err(|e| CreateBuyerError::Validation(e.to_string()))?;
        }
        validate_phone(&self.phone).map_err(|e| CreateBuyerError::Validation(e.to_string()))?;
        validate_budget(self.budget_min, self.budget_max)
            .map_err(|e| CreateBuyerError::Validation(e.to_string()))?;
        if self.property_type.is_residential() && self.bhk.is_none() {
            return Err(CreateBuyerError::Validation(
                "BHK is required for Apartment and Villa leads".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum CreateBuyerError {
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handle buyer creation
///
/// The caller becomes the owner. A `created` history entry is recorded
/// after the insert commits.
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    command: CreateBuyerCommand,
) -> Result<BuyerResponse, CreateBuyerError> {
    command.validate()?;

    let email = command
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);
    let status = command.status.unwrap_or(LeadStatus::New);

    let record = sqlx::query_as::<_, BuyerRecord>(&format!(
        r#"
        INSERT INTO buyers (
            full_name, email, phone, city, property_type, bhk, purpose,
            budget_min, budget_max, timeline, source, status, tags, notes, owner_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
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
    .bind(status.as_str())
    .bind(join_tags(&command.tags))
    .bind(command.notes.trim())
    .fetch_one(&pool)
    .await?;

    let response = BuyerResponse::from(record);

    history::record(
        &pool,
        NewHistoryEntry::new(response.id, user.id, HistoryAction::Created)
            .with_diff(json!({ "created": &response })),
    )
    .await;

    tracing::info!(
        buyer_id = %response.id,
        owner_id = %user.id,
        "Created buyer lead"
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_command() -> CreateBuyerCommand {
        CreateBuyerCommand {
            full_name: "Priya Sharma".to_string(),
            email: Some("priya@example.com".to_string()),
            phone: "9876543210".to_string(),
            city: City::Chandigarh,
            property_type: PropertyType::Apartment,
            bhk: Some(Bhk::Two),
            purpose: Purpose::Buy,
            budget_min: Some(5_000_000),
            budget_max: Some(7_000_000),
            timeline: Timeline::ZeroToThreeMonths,
            source: LeadSource::Website,
            status: None,
            tags: vec!["hot".to_string()],
            notes: String::new(),
        }
    }

    #[test]
    fn test_valid_command_passes() {
        assert!(valid_command().validate().is_ok());
    }

    #[test]
    fn test_short_name_rejected() {
        let mut command = valid_command();
        command.full_name = "P".to_string();
        assert!(matches!(
            command.validate(),
            Err(CreateBuyerError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_email_rejected_but_empty_allowed() {
        let mut command = valid_command();
        command.email = Some("not-an-email".to_string());
        assert!(command.validate().is_err());

        command.email = Some("  ".to_string());
        assert!(command.validate().is_ok());

        command.email = None;
        assert!(command.validate().is_ok());
    }

    #[test]
    fn test_inverted_budget_rejected() {
        let mut command = valid_command();
        command.budget_min = Some(9_000_000);
        command.budget_max = Some(1_000_000);
        assert!(command.validate().is_err());
    }

    #[test]
    fn test_residential_without_bhk_rejected() {
        let mut command = valid_command();
        command.bhk = None;
        assert!(command.validate().is_err());

        command.property_type = PropertyType::Plot;
        assert!(command.validate().is_ok());
    }
}
