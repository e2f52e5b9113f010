//! Category model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Category model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// Category read shape with the live count of books referencing it.
/// The count is recomputed on every read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryDetails {
    pub id: i32,
    pub name: String,
    pub book_count: i64,
}

/// Create category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Update category request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
}
