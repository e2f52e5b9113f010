//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor, UpdateAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT id, name, biography FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// List all authors
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let authors =
            sqlx::query_as::<_, Author>("SELECT id, name, biography FROM authors ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(authors)
    }

    /// Case-insensitive existence check on name
    pub async fn exists_by_name(&self, name: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE LOWER(name) = LOWER($1))")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name, biography) VALUES ($1, $2) RETURNING id, name, biography",
        )
        .bind(&author.name)
        .bind(&author.biography)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update an author
    pub async fn update(&self, id: i32, update: &UpdateAuthor) -> AppResult<Author> {
        let updated = sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET name = COALESCE($1, name),
                biography = COALESCE($2, biography)
            WHERE id = $3
            RETURNING id, name, biography
            "#,
        )
        .bind(&update.name)
        .bind(&update.biography)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
        Ok(updated)
    }

    /// Delete an author. Referencing books keep existing but lose the
    /// author link (ON DELETE SET NULL in the schema).
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }
}
