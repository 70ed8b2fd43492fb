//! Field validation helpers
//!
//! Shared by command validation and CSV row validation so that both paths
//! apply identical rules.

use serde::Serialize;
use thiserror::Error;

/// Minimum length for a buyer's full name
pub const NAME_MIN_LENGTH: usize = 2;

/// Maximum length for a buyer's full name
pub const NAME_MAX_LENGTH: usize = 256;

/// Phone digits, excluding an optional leading '+'
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;

/// A single field-level validation failure, serialized into error details
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("Full name must be at least {min} characters")]
    TooShort { min: usize },
    #[error("Full name cannot exceed {max} characters")]
    TooLong { max: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailValidationError {
    #[error("Email address is not valid")]
    InvalidFormat,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneValidationError {
    #[error("Phone must be {min} to {max} digits", min = PHONE_MIN_DIGITS, max = PHONE_MAX_DIGITS)]
    InvalidFormat,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetValidationError {
    #[error("Budget cannot be negative")]
    Negative,
    #[error("Minimum budget cannot exceed maximum budget")]
    MinAboveMax,
}

/// Validate a buyer's full name
pub fn validate_full_name(name: &str) -> Result<(), NameValidationError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < NAME_MIN_LENGTH {
        return Err(NameValidationError::TooShort {
            min: NAME_MIN_LENGTH,
        });
    }
    if trimmed.chars().count() > NAME_MAX_LENGTH {
        return Err(NameValidationError::TooLong {
            max: NAME_MAX_LENGTH,
        });
    }
    Ok(())
}

/// Validate an email address
///
/// Intentionally loose: one '@' with a dot somewhere after it, no
/// whitespace. Deliverability is not this layer's problem.
pub fn validate_email(email: &str) -> Result<(), EmailValidationError> {
    let email = email.trim();
    if email.contains(char::is_whitespace) {
        return Err(EmailValidationError::InvalidFormat);
    }
    let Some(at) = email.find('@') else {
        return Err(EmailValidationError::InvalidFormat);
    };
    if at == 0 || at != email.rfind('@').unwrap_or(at) {
        return Err(EmailValidationError::InvalidFormat);
    }
    let domain = &email[at + 1..];
    if domain.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err(EmailValidationError::InvalidFormat);
    }
    Ok(())
}

/// Validate a phone number: optional leading '+', then 10 to 15 digits
pub fn validate_phone(phone: &str) -> Result<(), PhoneValidationError> {
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PhoneValidationError::InvalidFormat);
    }
    if digits.len() < PHONE_MIN_DIGITS || digits.len() > PHONE_MAX_DIGITS {
        return Err(PhoneValidationError::InvalidFormat);
    }
    Ok(())
}

/// Validate an optional budget range
pub fn validate_budget(
    budget_min: Option<i64>,
    budget_max: Option<i64>,
) -> Result<(), BudgetValidationError> {
    if budget_min.is_some_and(|v| v < 0) || budget_max.is_some_and(|v| v < 0) {
        return Err(BudgetValidationError::Negative);
    }
    if let (Some(min), Some(max)) = (budget_min, budget_max) {
        if min > max {
            return Err(BudgetValidationError::MinAboveMax);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_bounds() {
        assert!(validate_full_name("Jo").is_ok());
        assert!(validate_full_name("  Priya Sharma  ").is_ok());
        assert_eq!(
            validate_full_name("J"),
            Err(NameValidationError::TooShort { min: 2 })
        );
        let long = "x".repeat(NAME_MAX_LENGTH + 1);
        assert_eq!(
            validate_full_name(&long),
            Err(NameValidationError::TooLong {
                max: NAME_MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_email_accepts_plausible_addresses() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        for bad in [
            "",
            "no-at-sign",
            "@example.com",
            "user@",
            "user@nodot",
            "user@.com",
            "user@example.",
            "two@@example.com",
            "has space@example.com",
        ] {
            assert!(validate_email(bad).is_err(), "accepted: {:?}", bad);
        }
    }

    #[test]
    fn test_phone_formats() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("+919876543210").is_ok());
        assert!(validate_phone("123456789").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("98765abc10").is_err());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("+").is_err());
    }

    #[test]
    fn test_budget_range() {
        assert!(validate_budget(None, None).is_ok());
        assert!(validate_budget(Some(100), None).is_ok());
        assert!(validate_budget(Some(100), Some(200)).is_ok());
        assert!(validate_budget(Some(100), Some(100)).is_ok());
        assert_eq!(
            validate_budget(Some(200), Some(100)),
            Err(BudgetValidationError::MinAboveMax)
        );
        assert_eq!(
            validate_budget(Some(-1), None),
            Err(BudgetValidationError::Negative)
        );
    }
}
