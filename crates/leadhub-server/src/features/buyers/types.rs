//! Buyer domain types
//!
//! The closed vocabularies (city, property type, BHK, purpose, timeline,
//! source, status) are enums at the API boundary and stored as their
//! canonical TEXT labels. Filter and import paths parse labels through
//! `FromStr` so an unknown label fails loudly with the allowed values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Cities served by the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum City {
    Chandigarh,
    Mohali,
    Zirakpur,
    Panchkula,
    Other,
}

impl City {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chandigarh => "Chandigarh",
            Self::Mohali => "Mohali",
            Self::Zirakpur => "Zirakpur",
            Self::Panchkula => "Panchkula",
            Self::Other => "Other",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["Chandigarh", "Mohali", "Zirakpur", "Panchkula", "Other"]
    }
}

/// Property categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Apartment,
    Villa,
    Plot,
    Office,
    Retail,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apartment => "Apartment",
            Self::Villa => "Villa",
            Self::Plot => "Plot",
            Self::Office => "Office",
            Self::Retail => "Retail",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["Apartment", "Villa", "Plot", "Office", "Retail"]
    }

    /// BHK only applies to residential property types
    pub fn is_residential(&self) -> bool {
        matches!(self, Self::Apartment | Self::Villa)
    }
}

/// Bedroom configuration for residential properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bhk {
    Studio,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
}

impl Bhk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Studio => "Studio",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["Studio", "1", "2", "3", "4"]
    }
}

/// Whether the lead wants to buy or rent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purpose {
    Buy,
    Rent,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Rent => "Rent",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["Buy", "Rent"]
    }
}

/// Purchase horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "0-3m")]
    ZeroToThreeMonths,
    #[serde(rename = "3-6m")]
    ThreeToSixMonths,
    #[serde(rename = ">6m")]
    MoreThanSixMonths,
    Exploring,
}

impl Timeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroToThreeMonths => "0-3m",
            Self::ThreeToSixMonths => "3-6m",
            Self::MoreThanSixMonths => ">6m",
            Self::Exploring => "Exploring",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["0-3m", "3-6m", ">6m", "Exploring"]
    }
}

/// How the lead reached us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadSource {
    Website,
    Referral,
    #[serde(rename = "Walk-in")]
    WalkIn,
    Call,
    Other,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::Referral => "Referral",
            Self::WalkIn => "Walk-in",
            Self::Call => "Call",
            Self::Other => "Other",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["Website", "Referral", "Walk-in", "Call", "Other"]
    }
}

/// Pipeline status of the lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Qualified,
    Contacted,
    Visited,
    Negotiation,
    Converted,
    Dropped,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Qualified => "Qualified",
            Self::Contacted => "Contacted",
            Self::Visited => "Visited",
            Self::Negotiation => "Negotiation",
            Self::Converted => "Converted",
            Self::Dropped => "Dropped",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &[
            "New",
            "Qualified",
            "Contacted",
            "Visited",
            "Negotiation",
            "Converted",
            "Dropped",
        ]
    }
}

macro_rules! impl_label_traits {
    ($($ty:ident),+) => {
        $(
            impl std::str::FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::variants()
                        .iter()
                        .position(|v| *v == s)
                        .map(|i| Self::ALL[i])
                        .ok_or_else(|| {
                            format!(
                                "Invalid value {:?}, expected one of: {}",
                                s,
                                Self::variants().join(", ")
                            )
                        })
                }
            }

            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.as_str())
                }
            }
        )+
    };
}

impl City {
    const ALL: [Self; 5] = [
        Self::Chandigarh,
        Self::Mohali,
        Self::Zirakpur,
        Self::Panchkula,
        Self::Other,
    ];
}

impl PropertyType {
    const ALL: [Self; 5] = [
        Self::Apartment,
        Self::Villa,
        Self::Plot,
        Self::Office,
        Self::Retail,
    ];
}

impl Bhk {
    const ALL: [Self; 5] = [Self::Studio, Self::One, Self::Two, Self::Three, Self::Four];
}

impl Purpose {
    const ALL: [Self; 2] = [Self::Buy, Self::Rent];
}

impl Timeline {
    const ALL: [Self; 4] = [
        Self::ZeroToThreeMonths,
        Self::ThreeToSixMonths,
        Self::MoreThanSixMonths,
        Self::Exploring,
    ];
}

impl LeadSource {
    const ALL: [Self; 5] = [
        Self::Website,
        Self::Referral,
        Self::WalkIn,
        Self::Call,
        Self::Other,
    ];
}

impl LeadStatus {
    const ALL: [Self; 7] = [
        Self::New,
        Self::Qualified,
        Self::Contacted,
        Self::Visited,
        Self::Negotiation,
        Self::Converted,
        Self::Dropped,
    ];
}

impl_label_traits!(City, PropertyType, Bhk, Purpose, Timeline, LeadSource, LeadStatus);

/// Column list matching [`BuyerRecord`], for SELECT statements
pub const BUYER_COLUMNS: &str = "id, full_name, email, phone, city, property_type, bhk, purpose, \
     budget_min, budget_max, timeline, source, status, tags, notes, owner_id, \
     created_at, updated_at";

/// A buyer row as stored
#[derive(Debug, Clone, FromRow)]
pub struct BuyerRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: String,
    pub property_type: String,
    pub bhk: Option<String>,
    pub purpose: String,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: String,
    pub source: String,
    pub status: String,
    pub tags: String,
    pub notes: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Buyer shape returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct BuyerResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: String,
    pub property_type: String,
    pub bhk: Option<String>,
    pub purpose: String,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: String,
    pub source: String,
    pub status: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BuyerRecord> for BuyerResponse {
    fn from(record: BuyerRecord) -> Self {
        Self {
            id: record.id,
            full_name: record.full_name,
            email: record.email,
            phone: record.phone,
            city: record.city,
            property_type: record.property_type,
            bhk: record.bhk,
            purpose: record.purpose,
            budget_min: record.budget_min,
            budget_max: record.budget_max,
            timeline: record.timeline,
            source: record.source,
            status: record.status,
            tags: split_tags(&record.tags),
            notes: record.notes,
            owner_id: record.owner_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Join tags into the comma-separated storage form
pub fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Split the stored comma-separated tags back into a list
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for label in City::variants() {
            assert_eq!(label.parse::<City>().map(|c| c.as_str()), Ok(*label));
        }
        for label in Timeline::variants() {
            assert_eq!(label.parse::<Timeline>().map(|t| t.as_str()), Ok(*label));
        }
        for label in LeadStatus::variants() {
            assert_eq!(label.parse::<LeadStatus>().map(|s| s.as_str()), Ok(*label));
        }
    }

    #[test]
    fn test_unknown_label_lists_allowed_values() {
        let err = "Gurgaon".parse::<City>().unwrap_err();
        assert!(err.contains("Gurgaon"));
        assert!(err.contains("Chandigarh"));
    }

    #[test]
    fn test_serde_uses_display_labels() {
        assert_eq!(
            serde_json::to_value(Timeline::ZeroToThreeMonths).unwrap(),
            serde_json::json!("0-3m")
        );
        assert_eq!(
            serde_json::to_value(LeadSource::WalkIn).unwrap(),
            serde_json::json!("Walk-in")
        );
        assert_eq!(
            serde_json::from_value::<Bhk>(serde_json::json!("3")).unwrap(),
            Bhk::Three
        );
    }

    #[test]
    fn test_residential_check() {
        assert!(PropertyType::Apartment.is_residential());
        assert!(PropertyType::Villa.is_residential());
        assert!(!PropertyType::Plot.is_residential());
    }

    #[test]
    fn test_tag_round_trip() {
        let tags = vec!["hot".to_string(), "follow up".to_string()];
        let joined = join_tags(&tags);
        assert_eq!(joined, "hot,follow up");
        assert_eq!(split_tags(&joined), tags);

        assert_eq!(split_tags(""), Vec::<String>::new());
        assert_eq!(join_tags(&[" ".to_string(), "".to_string()]), "");
    }
}
