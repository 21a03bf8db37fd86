//! Session token issuance and verification.
//!
//! Sessions are stateless: a signed JWT carrying the user id and a one-hour
//! expiry, transported in an HTTP-only cookie. Nothing is persisted server
//! side, so logout only clears the cookie; a logged-out token stays
//! cryptographically valid until its natural expiry.

use crate::error::AppError;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwt";

/// Session lifetime, for both the embedded expiry and the cookie max-age.
pub const SESSION_TTL_SECONDS: i64 = 60 * 60;

/// Claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's unique identifier.
    pub sub: i32,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs a session token for the given user, expiring one hour out.
pub fn issue_token(user_id: i32, secret: &str) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(SESSION_TTL_SECONDS))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies signature and expiry. Tampered and expired tokens collapse into
/// the same outward `Forbidden` signal.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Forbidden("Forbidden".into()))
}

/// Builds the session cookie: HTTP-only, Secure, SameSite=None so the
/// cross-site frontend can send it, max-age matching the token expiry.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::seconds(SESSION_TTL_SECONDS))
        .finish()
}

/// Expired empty cookie used by logout to clear the session client-side.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::ZERO)
        .finish()
}
