//! Uniform JSON response envelope.
//!
//! Every successful handler response carries `{success, errors, message}` and
//! optionally `data`; paginated listings additionally carry `pageNumber`,
//! `pageSize`, and `totalRecords` at the top level.

use serde::Serialize;

/// Standard success envelope. `errors` is always `null` on success.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub errors: Option<bool>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            errors: None,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope with no `data` field.
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            errors: None,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Success envelope for paginated listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T: Serialize> {
    pub page_number: i64,
    pub page_size: i64,
    pub total_records: i64,
    pub success: bool,
    pub errors: Option<bool>,
    pub message: String,
    pub data: Vec<T>,
}

impl<T: Serialize> PagedResponse<T> {
    pub fn ok(message: &str, data: Vec<T>, page_number: i64, page_size: i64, total: i64) -> Self {
        Self {
            page_number,
            page_size,
            total_records: total,
            success: true,
            errors: None,
            message: message.to_string(),
            data,
        }
    }
}
