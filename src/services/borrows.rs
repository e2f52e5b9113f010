//! Borrow/return workflow service.
//!
//! Resolves the acting member from the authenticated identity and drives
//! the transactional state machine in the borrows repository.

use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{
        borrow::{BorrowRecordDetails, UpdateBorrowRecord},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for the calling member
    pub async fn borrow_book(
        &self,
        book_id: i32,
        claims: &UserClaims,
        planned_return: Option<DateTime<Utc>>,
    ) -> AppResult<BorrowRecordDetails> {
        let member = self.repository.members.get_by_user_id(claims.user_id).await?;
        let record = self
            .repository
            .borrows
            .borrow(book_id, member.id, planned_return)
            .await?;

        tracing::info!(
            "Member {} borrowed book {} (record {})",
            member.id,
            book_id,
            record.id
        );
        self.repository.borrows.get_details(record.id).await
    }

    /// Return a book borrowed by the calling member
    pub async fn return_book(
        &self,
        book_id: i32,
        claims: &UserClaims,
    ) -> AppResult<BorrowRecordDetails> {
        let member = self.repository.members.get_by_user_id(claims.user_id).await?;
        let record = self
            .repository
            .borrows
            .return_borrow(book_id, member.id)
            .await?;

        tracing::info!(
            "Member {} returned book {} (record {})",
            member.id,
            book_id,
            record.id
        );
        self.repository.borrows.get_details(record.id).await
    }

    /// List borrow records. Admin callers see everything; members see
    /// only their own records.
    pub async fn list_records(&self, claims: &UserClaims) -> AppResult<Vec<BorrowRecordDetails>> {
        if claims.is_admin() {
            return self.repository.borrows.list_all().await;
        }
        let member = self.repository.members.get_by_user_id(claims.user_id).await?;
        self.repository.borrows.list_for_member(member.id).await
    }

    /// Get one borrow record, scoped like [`list_records`](Self::list_records)
    pub async fn get_record(&self, id: i32, claims: &UserClaims) -> AppResult<BorrowRecordDetails> {
        let details = self.repository.borrows.get_details(id).await?;
        if !claims.is_admin() {
            let member = self.repository.members.get_by_user_id(claims.user_id).await?;
            if details.member.id != member.id {
                // Scoped callers cannot probe other members' record ids
                return Err(crate::error::AppError::NotFound(format!(
                    "Borrow record with id {} not found",
                    id
                )));
            }
        }
        Ok(details)
    }

    /// Staff correction of a record; closing a loan through this path
    /// releases the book exactly like a return
    pub async fn update_record(
        &self,
        id: i32,
        update: UpdateBorrowRecord,
    ) -> AppResult<BorrowRecordDetails> {
        self.repository.borrows.update(id, &update).await?;
        self.repository.borrows.get_details(id).await
    }

    /// Staff deletion of a record
    pub async fn delete_record(&self, id: i32) -> AppResult<()> {
        self.repository.borrows.delete(id).await
    }
}
