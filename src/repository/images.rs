//! Book image attachments repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::image::BookImage,
};

#[derive(Clone)]
pub struct ImagesRepository {
    pool: Pool<Postgres>,
}

impl ImagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get image by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BookImage> {
        sqlx::query_as::<_, BookImage>(
            "SELECT id, book_id, image FROM book_images WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image with id {} not found", id)))
    }

    /// List images attached to a book
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookImage>> {
        let images = sqlx::query_as::<_, BookImage>(
            "SELECT id, book_id, image FROM book_images WHERE book_id = $1 ORDER BY id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    /// Record a stored image file for a book
    pub async fn create(&self, book_id: i32, image: &str) -> AppResult<BookImage> {
        let created = sqlx::query_as::<_, BookImage>(
            r#"
            INSERT INTO book_images (book_id, image)
            VALUES ($1, $2)
            RETURNING id, book_id, image
            "#,
        )
        .bind(book_id)
        .bind(image)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Delete an image row
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Image with id {} not found", id)));
        }
        Ok(())
    }
}
