//! Author endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor, UpdateAuthor},
    permissions::{self, Action, Resource},
};

use super::{AuthenticatedUser, MaybeAuthenticated};

/// List all authors
pub async fn list_authors(
    State(state): State<crate::AppState>,
    MaybeAuthenticated(claims): MaybeAuthenticated,
) -> AppResult<Json<Vec<Author>>> {
    permissions::check(claims.as_ref(), Resource::Authors, Action::List)?;

    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Get author by ID
pub async fn get_author(
    State(state): State<crate::AppState>,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i32>,
) -> AppResult<Json<Author>> {
    permissions::check(claims.as_ref(), Resource::Authors, Action::Retrieve)?;

    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create a new author
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(author): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    permissions::check(Some(&claims), Resource::Authors, Action::Create)?;
    author
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.catalog.create_author(author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an author
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    permissions::check(Some(&claims), Resource::Authors, Action::Update)?;
    update
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.catalog.update_author(id, update).await?;
    Ok(Json(updated))
}

/// Delete an author. Their books remain, with the author link cleared.
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    permissions::check(Some(&claims), Resource::Authors, Action::Delete)?;

    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
