use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Public identity record: what the auth gate attaches to a request and what
/// the API returns. Never carries the password hash or reset-token fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Full user row for credential and reset-token checks. Internal only; this
/// type is deliberately not serializable.
#[derive(Debug, FromRow)]
pub struct AuthUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub reset_token: Option<String>,
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuthUser {
    /// Column list matching this struct's `FromRow` layout, for the auth and
    /// reset queries that need the full row.
    pub const COLUMNS: &'static str =
        "id, name, email, password_hash, is_admin, reset_token, reset_token_expires, created_at";

    /// Strips the secrets off, leaving the public identity.
    pub fn summary(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at,
        }
    }
}

/// Admin update payload for `PUT /user/{id}`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Enter your fullname"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub is_admin: bool,
}
