pub mod task;
pub mod user;

pub use task::{Task, TaskInput};
pub use user::{AuthUser, UpdateUserRequest, User};

use serde::Deserialize;

/// Pagination query parameters shared by the user and task listings.
///
/// `pageNumber` defaults to 1 and `pageSize` to 10; when `hasPagination` is
/// absent or false the listing responds without the page bookkeeping fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
    pub has_pagination: Option<bool>,
}

impl PageQuery {
    pub fn page_number(&self) -> i64 {
        self.page_number.filter(|n| *n > 0).unwrap_or(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.filter(|n| *n > 0).unwrap_or(10)
    }

    pub fn offset(&self) -> i64 {
        (self.page_number() - 1) * self.page_size()
    }

    pub fn has_pagination(&self) -> bool {
        self.has_pagination.unwrap_or(false)
    }
}
