//! CSV exchange for buyer leads
//!
//! Export writes one row per buyer with the owning user's name or email in
//! the final column. Import is all-or-nothing: every row is validated
//! before anything is inserted, and failures report the spreadsheet row
//! number (header is row 1, so data row `i` reports `i + 2`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::shared::validation::{
    validate_budget, validate_email, validate_full_name, validate_phone, FieldError,
};

use super::types::{
    split_tags, Bhk, City, LeadSource, LeadStatus, PropertyType, Purpose, Timeline,
};

/// A buyer joined with its owner, ready for export
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BuyerExportRow {
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
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub owner_name: Option<String>,
    pub owner_email: String,
}

/// Flat record written to the export file
#[derive(Debug, Serialize)]
struct CsvRow {
    full_name: String,
    email: String,
    phone: String,
    city: String,
    property_type: String,
    bhk: String,
    purpose: String,
    budget_min: String,
    budget_max: String,
    timeline: String,
    source: String,
    status: String,
    tags: String,
    notes: String,
    created_at: String,
    updated_at: String,
    owner: String,
}

impl From<BuyerExportRow> for CsvRow {
    fn from(row: BuyerExportRow) -> Self {
        let owner = row.owner_name.unwrap_or(row.owner_email);
        Self {
            full_name: row.full_name,
            email: row.email.unwrap_or_default(),
            phone: row.phone,
            city: row.city,
            property_type: row.property_type,
            bhk: row.bhk.unwrap_or_default(),
            purpose: row.purpose,
            budget_min: row.budget_min.map(|v| v.to_string()).unwrap_or_default(),
            budget_max: row.budget_max.map(|v| v.to_string()).unwrap_or_default(),
            timeline: row.timeline,
            source: row.source,
            status: row.status,
            tags: row.tags,
            notes: row.notes,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
            owner,
        }
    }
}

/// Export column order, also used to emit a header for empty exports
pub const EXPORT_COLUMNS: [&str; 17] = [
    "full_name",
    "email",
    "phone",
    "city",
    "property_type",
    "bhk",
    "purpose",
    "budget_min",
    "budget_max",
    "timeline",
    "source",
    "status",
    "tags",
    "notes",
    "created_at",
    "updated_at",
    "owner",
];

/// Serialize export rows to a CSV document
pub fn write_csv(rows: Vec<BuyerExportRow>) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(EXPORT_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(CsvRow::from(row))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Raw import row before validation; every column is optional text
#[derive(Debug, Default, Deserialize)]
struct RawRow {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default)]
    bhk: Option<String>,
    #[serde(default)]
    purpose: Option<String>,
    #[serde(default)]
    budget_min: Option<String>,
    #[serde(default)]
    budget_max: Option<String>,
    #[serde(default)]
    timeline: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// A validated row ready for insertion
#[derive(Debug, Clone)]
pub struct NewBuyerRow {
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
    pub tags: String,
    pub notes: String,
}

/// Validation failures for one spreadsheet row
#[derive(Debug, Serialize)]
pub struct RowErrors {
    pub row: usize,
    pub errors: Vec<FieldError>,
}

/// Import failure: either the file is not parseable CSV, or rows failed
/// validation and nothing was inserted
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("{} row(s) failed validation", .0.len())]
    InvalidRows(Vec<RowErrors>),
    #[error("File contains no data rows")]
    Empty,
    #[error("File exceeds the {0}-row import limit")]
    TooManyRows(usize),
}

/// Hard cap on rows per import
pub const MAX_IMPORT_ROWS: usize = 200;

fn opt(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn validate_row(raw: &RawRow) -> Result<NewBuyerRow, Vec<FieldError>> {
    let mut errors = Vec::new();

    let full_name = match opt(&raw.full_name) {
        Some(name) => match validate_full_name(name) {
            Ok(()) => Some(name.to_string()),
            Err(e) => {
                errors.push(FieldError::new("full_name", e.to_string()));
                None
            },
        },
        None => {
            errors.push(FieldError::new("full_name", "Full name is required"));
            None
        },
    };

    let email = match opt(&raw.email) {
        Some(email) => match validate_email(email) {
            Ok(()) => Some(email.to_string()),
            Err(e) => {
                errors.push(FieldError::new("email", e.to_string()));
                None
            },
        },
        None => None,
    };

    let phone = match opt(&raw.phone) {
        Some(phone) => match validate_phone(phone) {
            Ok(()) => Some(phone.to_string()),
            Err(e) => {
                errors.push(FieldError::new("phone", e.to_string()));
                None
            },
        },
        None => {
            errors.push(FieldError::new("phone", "Phone is required"));
            None
        },
    };

    fn required_enum<T: std::str::FromStr<Err = String>>(
        value: Option<&str>,
        field: &str,
        errors: &mut Vec<FieldError>,
    ) -> Option<T> {
        match value {
            Some(s) => match s.parse::<T>() {
                Ok(v) => Some(v),
                Err(e) => {
                    errors.push(FieldError::new(field, e));
                    None
                },
            },
            None => {
                errors.push(FieldError::new(field, format!("{} is required", field)));
                None
            },
        }
    }

    let city = required_enum::<City>(opt(&raw.city), "city", &mut errors);
    let property_type =
        required_enum::<PropertyType>(opt(&raw.property_type), "property_type", &mut errors);
    let purpose = required_enum::<Purpose>(opt(&raw.purpose), "purpose", &mut errors);
    let timeline = required_enum::<Timeline>(opt(&raw.timeline), "timeline", &mut errors);
    let source = required_enum::<LeadSource>(opt(&raw.source), "source", &mut errors);

    let bhk = match opt(&raw.bhk) {
        Some(s) => match s.parse::<Bhk>() {
            Ok(v) => Some(v),
            Err(e) => {
                errors.push(FieldError::new("bhk", e));
                None
            },
        },
        None => None,
    };

    if let Some(property_type) = property_type {
        if property_type.is_residential() && bhk.is_none() && !errors.iter().any(|e| e.field == "bhk")
        {
            errors.push(FieldError::new(
                "bhk",
                "BHK is required for Apartment and Villa leads",
            ));
        }
    }

    let status = match opt(&raw.status) {
        Some(s) => match s.parse::<LeadStatus>() {
            Ok(v) => v,
            Err(e) => {
                errors.push(FieldError::new("status", e));
                LeadStatus::New
            },
        },
        None => LeadStatus::New,
    };

    fn parse_budget(
        value: Option<&str>,
        field: &str,
        errors: &mut Vec<FieldError>,
    ) -> Option<i64> {
        value.and_then(|s| match s.parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.push(FieldError::new(field, "Must be a whole number"));
                None
            },
        })
    }

    let budget_min = parse_budget(opt(&raw.budget_min), "budget_min", &mut errors);
    let budget_max = parse_budget(opt(&raw.budget_max), "budget_max", &mut errors);
    if let Err(e) = validate_budget(budget_min, budget_max) {
        errors.push(FieldError::new("budget_min", e.to_string()));
    }

    let tags = opt(&raw.tags)
        .map(|t| split_tags(t).join(","))
        .unwrap_or_default();
    let notes = opt(&raw.notes).unwrap_or_default().to_string();

    if !errors.is_empty() {
        return Err(errors);
    }

    // All required fields present once errors is empty
    match (
        full_name, phone, city, property_type, purpose, timeline, source,
    ) {
        (
            Some(full_name),
            Some(phone),
            Some(city),
            Some(property_type),
            Some(purpose),
            Some(timeline),
            Some(source),
        ) => Ok(NewBuyerRow {
            full_name,
            email,
            phone,
            city,
            property_type,
            bhk,
            purpose,
            budget_min,
            budget_max,
            timeline,
            source,
            status,
            tags,
            notes,
        }),
        _ => Err(vec![FieldError::new("row", "Row failed validation")]),
    }
}

/// Parse and validate an uploaded CSV file
///
/// Returns every valid row, or the full list of per-row failures if any
/// row is invalid.
pub fn parse_batch(data: &[u8]) -> Result<Vec<NewBuyerRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    let mut failures = Vec::new();

    for (i, result) in reader.deserialize::<RawRow>().enumerate() {
        if i >= MAX_IMPORT_ROWS {
            return Err(ImportError::TooManyRows(MAX_IMPORT_ROWS));
        }
        // Header is row 1 in the spreadsheet
        let row_number = i + 2;
        match result {
            Ok(raw) => match validate_row(&raw) {
                Ok(row) => rows.push(row),
                Err(errors) => failures.push(RowErrors {
                    row: row_number,
                    errors,
                }),
            },
            Err(err) => failures.push(RowErrors {
                row: row_number,
                errors: vec![FieldError::new("row", err.to_string())],
            }),
        }
    }

    if !failures.is_empty() {
        return Err(ImportError::InvalidRows(failures));
    }
    if rows.is_empty() {
        return Err(ImportError::Empty);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const HEADER: &str = "full_name,email,phone,city,property_type,bhk,purpose,budget_min,budget_max,timeline,source,status,tags,notes";

    fn csv_of(rows: &[&str]) -> Vec<u8> {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.into_bytes()
    }

    #[test]
    fn test_parse_valid_rows() {
        let data = csv_of(&[
            "Priya Sharma,priya@example.com,9876543210,Chandigarh,Apartment,2,Buy,5000000,7000000,0-3m,Website,New,hot,Prefers sector 22",
            "Arjun Mehta,,9812345678,Mohali,Plot,,Buy,,,Exploring,Referral,,,",
        ]);

        let rows = parse_batch(&data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].full_name, "Priya Sharma");
        assert_eq!(rows[0].city, City::Chandigarh);
        assert_eq!(rows[0].bhk, Some(Bhk::Two));
        assert_eq!(rows[0].budget_max, Some(7_000_000));
        assert_eq!(rows[1].email, None);
        assert_eq!(rows[1].status, LeadStatus::New);
        assert_eq!(rows[1].budget_min, None);
    }

    #[test]
    fn test_invalid_rows_reject_whole_batch() {
        let data = csv_of(&[
            "Priya Sharma,priya@example.com,9876543210,Chandigarh,Apartment,2,Buy,,,0-3m,Website,New,,",
            "X,bad-email,123,Nowhere,Apartment,,Buy,9,1,0-3m,Website,New,,",
        ]);

        let err = parse_batch(&data).unwrap_err();
        let ImportError::InvalidRows(failures) = err else {
            panic!("expected InvalidRows, got {:?}", err);
        };
        assert_eq!(failures.len(), 1);
        // Data row index 1, spreadsheet row 3
        assert_eq!(failures[0].row, 3);
        let fields: Vec<_> = failures[0].errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"full_name"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"phone"));
        assert!(fields.contains(&"city"));
        assert!(fields.contains(&"bhk"));
        assert!(fields.contains(&"budget_min"));
    }

    #[test]
    fn test_residential_rows_require_bhk() {
        let data = csv_of(&[
            "Priya Sharma,,9876543210,Chandigarh,Villa,,Buy,,,0-3m,Website,,,",
        ]);
        let err = parse_batch(&data).unwrap_err();
        let ImportError::InvalidRows(failures) = err else {
            panic!("expected InvalidRows");
        };
        assert!(failures[0].errors.iter().any(|e| e.field == "bhk"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let data = csv_of(&[]);
        assert!(matches!(parse_batch(&data), Err(ImportError::Empty)));
    }

    #[test]
    fn test_row_limit_enforced() {
        let row = "Priya Sharma,,9876543210,Chandigarh,Plot,,Buy,,,0-3m,Website,,,";
        let rows: Vec<&str> = std::iter::repeat(row).take(MAX_IMPORT_ROWS + 1).collect();
        let data = csv_of(&rows);
        assert!(matches!(
            parse_batch(&data),
            Err(ImportError::TooManyRows(MAX_IMPORT_ROWS))
        ));
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let output = write_csv(Vec::new()).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("full_name,"));
        assert!(output.trim_end().ends_with(",owner"));
    }

    #[test]
    fn test_export_prefers_owner_name() {
        let row = BuyerExportRow {
            full_name: "Priya Sharma".to_string(),
            email: Some("priya@example.com".to_string()),
            phone: "9876543210".to_string(),
            city: "Chandigarh".to_string(),
            property_type: "Apartment".to_string(),
            bhk: Some("2".to_string()),
            purpose: "Buy".to_string(),
            budget_min: Some(5_000_000),
            budget_max: None,
            timeline: "0-3m".to_string(),
            source: "Website".to_string(),
            status: "Qualified".to_string(),
            tags: "hot".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            owner_name: Some("Demo User".to_string()),
            owner_email: "user@example.com".to_string(),
        };

        let output = write_csv(vec![row]).unwrap();
        let mut lines = output.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("full_name,"));
        assert!(header.ends_with(",owner"));
        let data = lines.next().unwrap();
        assert!(data.contains("Demo User"));
        assert!(data.contains("5000000"));
        assert!(!data.contains("user@example.com"));
    }
}
