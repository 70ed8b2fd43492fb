//! Authentication and authorization
//!
//! Identity is derived per-request from the `x-user-id` header and resolved
//! against the `users` table; handlers receive a [`CurrentUser`] via the
//! extractor below. Authorization is deliberately centralized here: every
//! buyer endpoint goes through [`ensure_owner_or_admin`] instead of
//! repeating the ownership check per handler, and admin-only surfaces call
//! [`CurrentUser::require_admin`].

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::response::AppError;

/// Request header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Database row for a user account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, resolved once per request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Reject non-admin callers with a 403
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = PgPool::from_ref(state);

        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(format!("Missing {} header", USER_ID_HEADER))
            })?;

        let user_id = Uuid::parse_str(header).map_err(|_| {
            AppError::Unauthorized(format!("Invalid {} header", USER_ID_HEADER))
        })?;

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

        let role = row
            .role
            .parse::<UserRole>()
            .map_err(AppError::Internal)?;

        tracing::debug!(user_id = %row.id, role = %role, "Resolved caller identity");

        Ok(CurrentUser {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
        })
    }
}

/// The single ownership capability check
///
/// Permit iff the caller owns the record OR the caller is an admin.
pub fn ensure_owner_or_admin(
    user: &CurrentUser,
    owner_id: Uuid,
) -> Result<(), AppError> {
    if user.id == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to access this buyer".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: Some("Test".to_string()),
            email: "test@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("USER".parse::<UserRole>(), Ok(UserRole::User));
        assert_eq!("ADMIN".parse::<UserRole>(), Ok(UserRole::Admin));
        assert!("admin".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Admin.as_str(), "ADMIN");
    }

    #[test]
    fn test_owner_is_permitted() {
        let user = user_with_role(UserRole::User);
        assert!(ensure_owner_or_admin(&user, user.id).is_ok());
    }

    #[test]
    fn test_admin_is_permitted_on_foreign_record() {
        let admin = user_with_role(UserRole::Admin);
        assert!(ensure_owner_or_admin(&admin, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_non_owner_is_rejected() {
        let user = user_with_role(UserRole::User);
        let result = ensure_owner_or_admin(&user, Uuid::new_v4());
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_require_admin() {
        assert!(user_with_role(UserRole::Admin).require_admin().is_ok());
        assert!(matches!(
            user_with_role(UserRole::User).require_admin(),
            Err(AppError::Forbidden(_))
        ));
    }
}
