//! Member management service

use crate::{
    error::{AppError, AppResult},
    models::{
        member::{CreateMember, MemberDetails, UpdateMember},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_members(&self) -> AppResult<Vec<MemberDetails>> {
        self.repository.members.list().await
    }

    /// Get one member. Admin callers see any profile; members see only
    /// their own, and cannot probe other members' ids.
    pub async fn get_member(&self, id: i32, claims: &UserClaims) -> AppResult<MemberDetails> {
        let details = self.repository.members.get_by_id(id).await?;
        if !claims.is_admin() && details.user_id != claims.user_id {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }
        Ok(details)
    }

    /// Create a member profile linked to an identity-service user
    pub async fn create_member(&self, member: CreateMember) -> AppResult<MemberDetails> {
        let created = self.repository.members.create(&member).await?;
        self.repository.members.get_by_id(created.id).await
    }

    pub async fn update_member(&self, id: i32, update: UpdateMember) -> AppResult<MemberDetails> {
        self.repository.members.update(id, &update).await?;
        self.repository.members.get_by_id(id).await
    }

    pub async fn delete_member(&self, id: i32) -> AppResult<()> {
        self.repository.members.delete(id).await
    }
}
