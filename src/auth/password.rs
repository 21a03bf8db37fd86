use actix_web::web;
use bcrypt::{hash, verify};

use crate::error::AppError;

const BCRYPT_COST: u32 = 10;

/// Synchronous digest computation. Runs on the blocking pool via the async
/// wrappers below; only tests call it directly.
pub fn hash_password_sync(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password_sync(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Hashes on the blocking pool: bcrypt is deliberately slow, and inline it
/// would stall every other in-flight request on this worker.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    web::block(move || hash_password_sync(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Hash worker failed: {}", e)))?
}

/// Verifies on the blocking pool, for the same reason as `hash_password`.
pub async fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hashed_password = hashed_password.to_string();
    web::block(move || verify_password_sync(&password, &hashed_password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Verify worker failed: {}", e)))?
}
