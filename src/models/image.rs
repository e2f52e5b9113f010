//! Book image attachment model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Image attachment owned by a book, deleted with it.
/// `image` is the path of the stored file relative to the media directory.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookImage {
    pub id: i32,
    pub book_id: i32,
    pub image: String,
}
