//! Password-reset token management.
//!
//! Each user holds at most one pending reset token: a 256-bit random secret
//! stored on the user row together with an absolute expiry 30 minutes out.
//! Issuing a new token overwrites (supersedes) any previous one. Resolving a
//! token filters on the expiry; consuming it does not re-check expiry, but
//! clears the stored token so it cannot be replayed.

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::AuthUser;
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;

/// Reset links are valid for 30 minutes.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

/// 32 random bytes, hex-encoded: 256 bits of entropy, 64 characters.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Link embedded in the reset email, pointing at the frontend's reset page.
pub fn reset_link(base_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={}", base_url, token)
}

/// Temporary password an admin reset assigns: the user's first name plus a
/// fixed suffix.
pub fn temp_password_for(name: &str) -> String {
    let first_name = name.split_whitespace().next().unwrap_or(name);
    format!("{}@123", first_name)
}

/// Issues a fresh reset token for the account behind `email`, superseding any
/// pending one, and returns it for delivery.
pub async fn issue_reset_token(pool: &PgPool, email: &str) -> Result<String, AppError> {
    let user_id: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if user_id.is_none() {
        return Err(AppError::NotFound(
            "User does not exist. Please provide valid email address.".into(),
        ));
    }

    let token = generate_reset_token();
    let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

    sqlx::query("UPDATE users SET reset_token = $1, reset_token_expires = $2 WHERE email = $3")
        .bind(&token)
        .bind(expires)
        .bind(email)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Looks up the account holding a still-valid token and returns its email.
/// An unknown token and an expired one are indistinguishable to the caller.
pub async fn resolve_reset_token(pool: &PgPool, token: &str) -> Result<String, AppError> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT email FROM users WHERE reset_token = $1 AND reset_token_expires > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((email,)) => Ok(email),
        None => Err(AppError::NotFound(
            "The link sent to your email has been expired! Please try again.".into(),
        )),
    }
}

/// Rotates the password of whoever holds `token`. Rejects a replacement that
/// matches the current password. On success the token fields are cleared, so
/// the token is single use.
pub async fn consume_reset_token(
    pool: &PgPool,
    token: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let user: Option<AuthUser> = sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE reset_token = $1",
        AuthUser::COLUMNS
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let user = user.ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if verify_password(new_password, &user.password_hash).await? {
        return Err(AppError::BadRequest(
            "Password must be different from previous password!".into(),
        ));
    }

    let hashed = hash_password(new_password).await?;

    sqlx::query(
        "UPDATE users SET password_hash = $1, reset_token = NULL, reset_token_expires = NULL \
         WHERE id = $2",
    )
    .bind(&hashed)
    .bind(user.id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Admin-issued reset: stores the hash of the deterministic temporary
/// password derived from the user's first name.
pub async fn admin_reset_password(pool: &PgPool, email: &str) -> Result<(), AppError> {
    let user: Option<AuthUser> = sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE email = $1",
        AuthUser::COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let user = user.ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let hashed = hash_password(&temp_password_for(&user.name)).await?;

    sqlx::query("UPDATE users SET password_hash = $1 WHERE email = $2")
        .bind(&hashed)
        .bind(email)
        .execute(pool)
        .await?;

    Ok(())
}
