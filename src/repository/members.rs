//! Members repository.
//!
//! Members link one-to-one to rows in the identity service's users table;
//! that table is read here only to resolve display name and email.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, MemberDetails, UpdateMember},
};

const DETAILS_QUERY: &str = r#"
    SELECT m.id, m.user_id, u.username AS name, u.email, m.membership_date
    FROM members m
    JOIN users u ON m.user_id = u.id
"#;

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID with identity details
    pub async fn get_by_id(&self, id: i32) -> AppResult<MemberDetails> {
        sqlx::query_as::<_, MemberDetails>(&format!("{DETAILS_QUERY} WHERE m.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Resolve the member profile of an authenticated identity
    pub async fn get_by_user_id(&self, user_id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            "SELECT id, user_id, membership_date FROM members WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No member profile for this user".to_string()))
    }

    /// List all members with identity details
    pub async fn list(&self) -> AppResult<Vec<MemberDetails>> {
        let members =
            sqlx::query_as::<_, MemberDetails>(&format!("{DETAILS_QUERY} ORDER BY m.id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(members)
    }

    /// Create a member profile for an identity. membership_date is set here
    /// and never updated.
    pub async fn create(&self, member: &CreateMember) -> AppResult<Member> {
        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(member.user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                member.user_id
            )));
        }

        let already: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE user_id = $1)")
                .bind(member.user_id)
                .fetch_one(&self.pool)
                .await?;
        if already {
            return Err(AppError::Conflict(
                "A member profile already exists for this user.".to_string(),
            ));
        }

        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (user_id, membership_date)
            VALUES ($1, NOW())
            RETURNING id, user_id, membership_date
            "#,
        )
        .bind(member.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Correct the identity link of a member
    pub async fn update(&self, id: i32, update: &UpdateMember) -> AppResult<Member> {
        let updated = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET user_id = COALESCE($1, user_id)
            WHERE id = $2
            RETURNING id, user_id, membership_date
            "#,
        )
        .bind(update.user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;
        Ok(updated)
    }

    /// Delete a member. Borrow records cascade in the schema, so books the
    /// member still holds are released in the same transaction; otherwise
    /// they would stay unavailable with no record left to repair through.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE books SET availability_status = TRUE
            WHERE id IN (
                SELECT book_id FROM borrow_records
                WHERE member_id = $1 AND status = 'BORROWED'
            )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}
