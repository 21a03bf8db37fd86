pub mod extractors;
pub mod middleware;
pub mod password;
pub mod reset;
pub mod token;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::{AdminGuard, AuthMiddleware};
pub use password::{hash_password, verify_password};
pub use token::{clear_session_cookie, issue_token, session_cookie, verify_token, Claims};

lazy_static! {
    // Allowed password alphabet; the per-class requirements are checked below
    // because the regex crate has no lookahead support.
    static ref PASSWORD_CHARSET: regex::Regex =
        regex::Regex::new(r"^[A-Za-z\d@$!%*?&]{8,20}$").unwrap();
}

/// Password strength rule: 8-20 chars from the allowed alphabet with at least
/// one lowercase letter, one uppercase letter, one digit, and one special
/// character (`@$!%*?&`).
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let strong = PASSWORD_CHARSET.is_match(password)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| "@$!%*?&".contains(c));

    if strong {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message = Some(
            "Password must be at least 8 characters long and contain at least one lowercase \
             letter, one uppercase letter, one number, and one special character."
                .into(),
        );
        Err(err)
    }
}

/// Payload for `POST /user/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, e.g. "Jane Doe".
    #[validate(length(min = 1, message = "Enter your fullname"))]
    pub name: String,
    #[validate(email(message = "Enter your email address"))]
    pub email: String,
    #[validate(custom = "validate_password_strength")]
    pub password: String,
}

/// Payload for `POST /user/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter your email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Enter your password"))]
    pub password: String,
}

/// Payload for `POST /user/send-email` (password-reset request).
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub email: Option<String>,
}

/// Payload for `PUT /user/forgot-password`: the emailed reset token plus the
/// replacement password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1, message = "No token provided!"))]
    pub token: String,
    #[validate(custom = "validate_password_strength")]
    pub new_password: String,
}

/// Payload for `PUT /user/reset-password` (admin-issued temporary password).
#[derive(Debug, Deserialize)]
pub struct AdminResetRequest {
    pub email: Option<String>,
}
