//!
//! # Custom Error Handling
//!
//! Defines the application-wide error type `AppError` and its mapping onto
//! HTTP responses. Every handler and middleware returns `AppError`, which
//! implements `actix_web::error::ResponseError` so failures are rendered as
//! the uniform `{success, errors, message}` JSON envelope the API uses
//! everywhere.
//!
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError` let handlers use
//! the `?` operator throughout.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// All failure modes the backend can surface to a client.
#[derive(Debug)]
pub enum AppError {
    /// Missing authentication (no session cookie, or no matching identity).
    /// Also used for non-admin callers hitting admin routes. HTTP 401.
    Unauthorized(String),
    /// Bad credentials or an invalid/expired session token. HTTP 403.
    Forbidden(String),
    /// Malformed or unacceptable request: duplicate email, reused password,
    /// failed update, missing field. HTTP 400.
    BadRequest(String),
    /// Entity, email, or reset token absent (or reset link expired). HTTP 404.
    NotFound(String),
    /// Unexpected server-side failure (crypto, mail, config). HTTP 500.
    InternalServerError(String),
    /// Store-level failure. The detail is logged, never sent to the client.
    /// HTTP 500.
    DatabaseError(String),
    /// Failed input validation. HTTP 400.
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

fn envelope(message: &str) -> serde_json::Value {
    json!({
        "success": false,
        "errors": true,
        "message": message,
    })
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(envelope(msg)),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(envelope(msg)),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(envelope(msg)),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(envelope(msg)),
            AppError::ValidationError(msg) => HttpResponse::BadRequest().json(envelope(msg)),
            // Internal detail is logged; the client gets a generic message.
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(envelope("Something went wrong"))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT processing failures (bad signature, expired) map to `Forbidden`:
/// a tampered and an expired token are indistinguishable to the client.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Forbidden(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
