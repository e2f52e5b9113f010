//! Borrow record endpoints.
//!
//! The borrow and return actions live on books (`/books/:id/borrow`,
//! `/books/:id/return`); these endpoints expose the records themselves,
//! scoped to the caller unless the caller is staff.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::borrow::{BorrowRecordDetails, UpdateBorrowRecord},
    permissions::{self, Action, Resource},
};

use super::AuthenticatedUser;

/// List borrow records visible to the caller
pub async fn list_records(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecordDetails>>> {
    permissions::check(Some(&claims), Resource::BorrowRecords, Action::List)?;

    let records = state.services.borrows.list_records(&claims).await?;
    Ok(Json(records))
}

/// Get a borrow record by ID
pub async fn get_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRecordDetails>> {
    permissions::check(Some(&claims), Resource::BorrowRecords, Action::Retrieve)?;

    let record = state.services.borrows.get_record(id, &claims).await?;
    Ok(Json(record))
}

/// Staff correction of a borrow record. Setting return_date on an active
/// record closes the loan and releases the book.
pub async fn update_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateBorrowRecord>,
) -> AppResult<Json<BorrowRecordDetails>> {
    permissions::check(Some(&claims), Resource::BorrowRecords, Action::Update)?;

    let updated = state.services.borrows.update_record(id, update).await?;
    Ok(Json(updated))
}

/// Staff deletion of a borrow record
pub async fn delete_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    permissions::check(Some(&claims), Resource::BorrowRecords, Action::Delete)?;

    state.services.borrows.delete_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
