//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CategoryDetails, CreateCategory, UpdateCategory},
    permissions::{self, Action, Resource},
};

use super::{AuthenticatedUser, MaybeAuthenticated};

/// List all categories with live book counts
pub async fn list_categories(
    State(state): State<crate::AppState>,
    MaybeAuthenticated(claims): MaybeAuthenticated,
) -> AppResult<Json<Vec<CategoryDetails>>> {
    permissions::check(claims.as_ref(), Resource::Categories, Action::List)?;

    let categories = state.services.catalog.list_categories().await?;
    Ok(Json(categories))
}

/// Get category by ID with its live book count
pub async fn get_category(
    State(state): State<crate::AppState>,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i32>,
) -> AppResult<Json<CategoryDetails>> {
    permissions::check(claims.as_ref(), Resource::Categories, Action::Retrieve)?;

    let category = state.services.catalog.get_category(id).await?;
    Ok(Json(category))
}

/// Create a new category
pub async fn create_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(category): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    permissions::check(Some(&claims), Resource::Categories, Action::Create)?;
    category
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.catalog.create_category(category).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a category
pub async fn update_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    permissions::check(Some(&claims), Resource::Categories, Action::Update)?;
    update
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.catalog.update_category(id, update).await?;
    Ok(Json(updated))
}

/// Delete a category. Referencing books keep existing with the
/// category link cleared.
pub async fn delete_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    permissions::check(Some(&claims), Resource::Categories, Action::Delete)?;

    state.services.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
