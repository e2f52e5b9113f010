//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::author::Author;
use super::category::Category;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub isbn: String,
    /// True if available for borrowing. False iff an active borrow
    /// record exists for this book.
    pub availability_status: bool,
}

/// Book read shape with nested author and category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub author: Option<Author>,
    pub category: Option<Category>,
    pub isbn: String,
    pub availability_status: bool,
}

/// Create book request. References are accepted as identifiers;
/// reads embed the full nested objects.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    /// Unique 10 or 13-digit ISBN
    #[validate(length(min = 10, max = 13, message = "ISBN must be 10-13 characters"))]
    pub isbn: String,
}

/// Update book request.
///
/// The nullable references use double options: an absent field leaves the
/// reference untouched, an explicit JSON null clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    pub author_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    pub category_id: Option<Option<i32>>,
    #[validate(length(min = 10, max = 13, message = "ISBN must be 10-13 characters"))]
    pub isbn: Option<String>,
}

/// Present field (including null) becomes Some(..); absent stays None
fn deserialize_explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_from_null_references() {
        let update: UpdateBook = serde_json::from_str(r#"{ "title": "Dune" }"#).unwrap();
        assert_eq!(update.author_id, None);
        assert_eq!(update.category_id, None);

        let update: UpdateBook =
            serde_json::from_str(r#"{ "author_id": null, "category_id": 3 }"#).unwrap();
        assert_eq!(update.author_id, Some(None));
        assert_eq!(update.category_id, Some(Some(3)));
    }
}

/// Book query parameters
#[derive(Debug, Deserialize)]
pub struct BookQuery {
    /// Substring search in title
    pub title: Option<String>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
