//! Books repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{Book, BookDetails, BookQuery, CreateBook, UpdateBook},
        category::Category,
    },
};

/// Column list shared by every query that hydrates a [`BookDetails`].
/// Author and category come from LEFT JOINs and may be entirely null.
pub(crate) const BOOK_DETAILS_COLUMNS: &str = r#"
    b.id, b.title, b.isbn, b.availability_status,
    a.id AS author_id, a.name AS author_name, a.biography AS author_biography,
    c.id AS category_id, c.name AS category_name
"#;

/// Build a [`BookDetails`] from a row selected with [`BOOK_DETAILS_COLUMNS`].
pub(crate) fn book_details_from_row(row: &PgRow) -> BookDetails {
    let author = row
        .get::<Option<i32>, _>("author_id")
        .map(|id| Author {
            id,
            name: row.get("author_name"),
            biography: row.get("author_biography"),
        });
    let category = row
        .get::<Option<i32>, _>("category_id")
        .map(|id| Category {
            id,
            name: row.get("category_name"),
        });

    BookDetails {
        id: row.get("id"),
        title: row.get("title"),
        author,
        category,
        isbn: row.get("isbn"),
        availability_status: row.get("availability_status"),
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the raw book row by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, category_id, isbn, availability_status FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ID with nested author and category
    pub async fn get_details(&self, id: i32) -> AppResult<BookDetails> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {BOOK_DETAILS_COLUMNS}
            FROM books b
            LEFT JOIN authors a ON b.author_id = a.id
            LEFT JOIN categories c ON b.category_id = c.id
            WHERE b.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(book_details_from_row(&row))
    }

    /// Search books with filters and pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let title_pattern = query.title.as_ref().map(|t| format!("%{}%", t));

        let rows = sqlx::query(&format!(
            r#"
            SELECT {BOOK_DETAILS_COLUMNS}
            FROM books b
            LEFT JOIN authors a ON b.author_id = a.id
            LEFT JOIN categories c ON b.category_id = c.id
            WHERE ($1::text IS NULL OR b.title ILIKE $1)
              AND ($2::int IS NULL OR b.author_id = $2)
              AND ($3::int IS NULL OR b.category_id = $3)
              AND ($4::bool IS NULL OR b.availability_status = $4)
            ORDER BY b.title
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(&title_pattern)
        .bind(query.author_id)
        .bind(query.category_id)
        .bind(query.available)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM books b
            WHERE ($1::text IS NULL OR b.title ILIKE $1)
              AND ($2::int IS NULL OR b.author_id = $2)
              AND ($3::int IS NULL OR b.category_id = $3)
              AND ($4::bool IS NULL OR b.availability_status = $4)
            "#,
        )
        .bind(&title_pattern)
        .bind(query.author_id)
        .bind(query.category_id)
        .bind(query.available)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.iter().map(book_details_from_row).collect(), total))
    }

    /// Exact-title existence check
    pub async fn exists_by_title(&self, title: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE title = $1)")
                .bind(title)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// ISBN existence check, optionally excluding one book (for updates)
    pub async fn exists_by_isbn(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new book, available by default
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, category_id, isbn, availability_status)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id, title, author_id, category_id, isbn, availability_status
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(book.category_id)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update a book's bibliographic fields. availability_status is owned
    /// by the borrow workflow and never touched here. The nullable
    /// references are double options: absent leaves the link, explicit
    /// null clears it back to NULL.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($1, title),
                author_id = CASE WHEN $2 THEN $3 ELSE author_id END,
                category_id = CASE WHEN $4 THEN $5 ELSE category_id END,
                isbn = COALESCE($6, isbn)
            WHERE id = $7
            RETURNING id, title, author_id, category_id, isbn, availability_status
            "#,
        )
        .bind(&update.title)
        .bind(update.author_id.is_some())
        .bind(update.author_id.flatten())
        .bind(update.category_id.is_some())
        .bind(update.category_id.flatten())
        .bind(&update.isbn)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        Ok(updated)
    }

    /// Delete a book. Images and borrow records cascade in the schema.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
