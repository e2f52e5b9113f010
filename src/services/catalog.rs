//! Catalog management service: books, authors, categories and book images.
//!
//! Creation paths run explicit duplicate checks before insert so callers
//! get a clean message instead of a raw constraint violation.

use std::path::{Path, PathBuf};

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
    models::{
        author::{CreateAuthor, UpdateAuthor},
        book::{BookDetails, BookQuery, CreateBook, UpdateBook},
        category::{CreateCategory, UpdateCategory},
        image::BookImage,
        Author, Category, CategoryDetails,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    storage: StorageConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, storage: StorageConfig) -> Self {
        Self { repository, storage }
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Search books with filters
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        self.repository.books.search(query).await
    }

    /// Get book by ID with nested author and category
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_details(id).await
    }

    /// Create a new book. Title must be unique (exact), ISBN unique.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<BookDetails> {
        if self.repository.books.exists_by_title(&book.title).await? {
            return Err(AppError::Conflict("Book already exists.".to_string()));
        }
        if self.repository.books.exists_by_isbn(&book.isbn, None).await? {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists.".to_string(),
            ));
        }
        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        if let Some(category_id) = book.category_id {
            self.repository.categories.get_by_id(category_id).await?;
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!("Created book id={} title={:?}", created.id, created.title);
        self.repository.books.get_details(created.id).await
    }

    /// Update a book's bibliographic fields
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<BookDetails> {
        if let Some(ref isbn) = update.isbn {
            if self.repository.books.exists_by_isbn(isbn, Some(id)).await? {
                return Err(AppError::Conflict(
                    "A book with this ISBN already exists.".to_string(),
                ));
            }
        }
        if let Some(Some(author_id)) = update.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        if let Some(Some(category_id)) = update.category_id {
            self.repository.categories.get_by_id(category_id).await?;
        }

        self.repository.books.update(id, &update).await?;
        self.repository.books.get_details(id).await
    }

    /// Delete a book and its stored image files. DB rows for images and
    /// borrow records cascade with the book.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let images = self.repository.images.list_for_book(id).await?;
        self.repository.books.delete(id).await?;

        // File removal is best-effort; a leftover file is not an error
        for image in images {
            let path = self.media_path(&image.image);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Failed to remove image file {:?}: {}", path, e);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Book images
    // =========================================================================

    /// List images attached to a book
    pub async fn list_book_images(&self, book_id: i32) -> AppResult<Vec<BookImage>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.images.list_for_book(book_id).await
    }

    /// Store an uploaded image for a book and record it
    pub async fn add_book_image(
        &self,
        book_id: i32,
        filename: &str,
        data: &[u8],
    ) -> AppResult<BookImage> {
        self.repository.books.get_by_id(book_id).await?;

        if data.is_empty() {
            return Err(AppError::Validation("Empty image upload".to_string()));
        }

        let safe_name = sanitize_filename(filename);
        let relative = format!("books/{}/{}", book_id, safe_name);
        let path = self.media_path(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create media dir: {}", e)))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store image: {}", e)))?;

        self.repository.images.create(book_id, &relative).await
    }

    /// Delete an image row and its stored file
    pub async fn delete_book_image(&self, id: i32) -> AppResult<()> {
        let image = self.repository.images.get_by_id(id).await?;
        self.repository.images.delete(id).await?;

        let path = self.media_path(&image.image);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove image file {:?}: {}", path, e);
        }
        Ok(())
    }

    fn media_path(&self, relative: &str) -> PathBuf {
        Path::new(&self.storage.media_dir).join(relative)
    }

    // =========================================================================
    // Authors
    // =========================================================================

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    /// Create a new author; names are unique case-insensitively
    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        if self.repository.authors.exists_by_name(&author.name).await? {
            return Err(AppError::Conflict(
                "Author with this name already exists.".to_string(),
            ));
        }
        self.repository.authors.create(&author).await
    }

    pub async fn update_author(&self, id: i32, update: UpdateAuthor) -> AppResult<Author> {
        self.repository.authors.update(id, &update).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn list_categories(&self) -> AppResult<Vec<CategoryDetails>> {
        self.repository.categories.list().await
    }

    pub async fn get_category(&self, id: i32) -> AppResult<CategoryDetails> {
        self.repository.categories.get_by_id(id).await
    }

    /// Create a new category; names are unique case-insensitively
    pub async fn create_category(&self, category: CreateCategory) -> AppResult<Category> {
        if self
            .repository
            .categories
            .exists_by_name(&category.name)
            .await?
        {
            return Err(AppError::Conflict(
                "Category with this name already exists.".to_string(),
            ));
        }
        self.repository.categories.create(&category).await
    }

    pub async fn update_category(&self, id: i32, update: UpdateCategory) -> AppResult<Category> {
        self.repository.categories.update(id, &update).await
    }

    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        self.repository.categories.delete(id).await
    }
}

/// Keep only filename-safe characters; uploads choose their own names
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_filename;

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("cover.jpg"), "cover.jpg");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_filename("///"), "upload.bin");
    }
}
