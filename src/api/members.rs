//! Member endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::member::{CreateMember, MemberDetails, UpdateMember},
    permissions::{self, Action, Resource},
};

use super::AuthenticatedUser;

/// List all members (admin only)
pub async fn list_members(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<MemberDetails>>> {
    permissions::check(Some(&claims), Resource::Members, Action::List)?;

    let members = state.services.members.list_members().await?;
    Ok(Json(members))
}

/// Get member by ID. Retrieval is scoped to the caller's own profile
/// unless the caller is staff.
pub async fn get_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MemberDetails>> {
    permissions::check(Some(&claims), Resource::Members, Action::Retrieve)?;

    let member = state.services.members.get_member(id, &claims).await?;
    Ok(Json(member))
}

/// Create a member profile for an identity-service user
pub async fn create_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(member): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<MemberDetails>)> {
    permissions::check(Some(&claims), Resource::Members, Action::Create)?;

    let created = state.services.members.create_member(member).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a member's identity link (membership_date is immutable)
pub async fn update_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateMember>,
) -> AppResult<Json<MemberDetails>> {
    permissions::check(Some(&claims), Resource::Members, Action::Update)?;

    let updated = state.services.members.update_member(id, update).await?;
    Ok(Json(updated))
}

/// Delete a member
pub async fn delete_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    permissions::check(Some(&claims), Resource::Members, Action::Delete)?;

    state.services.members.delete_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
