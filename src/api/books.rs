//! Book (catalog) endpoints, including the borrow/return actions and
//! nested image attachments

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookDetails, BookQuery, CreateBook, UpdateBook},
        borrow::{BorrowRecordDetails, BorrowRequest},
        image::BookImage,
    },
    permissions::{self, Action, Resource},
};

use super::{AuthenticatedUser, MaybeAuthenticated};

/// Paginated response wrapper
#[derive(Serialize)]
pub struct PaginatedResponse<T> {
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// List books with filters and pagination
pub async fn list_books(
    State(state): State<crate::AppState>,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookDetails>>> {
    permissions::check(claims.as_ref(), Resource::Books, Action::List)?;

    let (items, total) = state.services.catalog.search_books(&query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get book details by ID
pub async fn get_book(
    State(state): State<crate::AppState>,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    permissions::check(claims.as_ref(), Resource::Books, Action::Retrieve)?;

    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    permissions::check(Some(&claims), Resource::Books, Action::Create)?;
    book.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<BookDetails>> {
    permissions::check(Some(&claims), Resource::Books, Action::Update)?;
    update
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.catalog.update_book(id, update).await?;
    Ok(Json(updated))
}

/// Delete a book
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    permissions::check(Some(&claims), Resource::Books, Action::Delete)?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Borrow a book for the calling member
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    body: Option<Json<BorrowRequest>>,
) -> AppResult<(StatusCode, Json<BorrowRecordDetails>)> {
    permissions::check(Some(&claims), Resource::Books, Action::Borrow)?;

    let request = body.map(|Json(r)| r).unwrap_or_default();
    let record = state
        .services
        .borrows
        .borrow_book(id, &claims, request.return_date)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a book borrowed by the calling member
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRecordDetails>> {
    permissions::check(Some(&claims), Resource::Books, Action::Return)?;

    let record = state.services.borrows.return_book(id, &claims).await?;
    Ok(Json(record))
}

/// List images attached to a book
pub async fn list_book_images(
    State(state): State<crate::AppState>,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookImage>>> {
    permissions::check(claims.as_ref(), Resource::BookImages, Action::List)?;

    let images = state.services.catalog.list_book_images(id).await?;
    Ok(Json(images))
}

/// Upload an image attachment for a book (multipart, field name "image")
pub async fn create_book_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<BookImage>)> {
    permissions::check(Some(&claims), Resource::BookImages, Action::Create)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field
            .file_name()
            .unwrap_or("upload.bin")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let image = state
            .services
            .catalog
            .add_book_image(id, &filename, &data)
            .await?;
        return Ok((StatusCode::CREATED, Json(image)));
    }

    Err(AppError::BadRequest(
        "Missing multipart field \"image\"".to_string(),
    ))
}

/// Delete an image attachment
pub async fn delete_book_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    permissions::check(Some(&claims), Resource::BookImages, Action::Delete)?;

    state.services.catalog.delete_book_image(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
