//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub biography: String,
}

/// Create author request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAuthor {
    /// Author name, unique case-insensitively
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub biography: String,
}

/// Update author request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    pub biography: Option<String>,
}
