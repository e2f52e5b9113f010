//! Borrow records repository.
//!
//! The borrow, return and correction paths all run inside a single
//! transaction that locks the books row (SELECT ... FOR UPDATE) before the
//! availability check-and-set, so two concurrent borrows of the same book
//! cannot both pass the check. Either both the record write and the book
//! write commit, or neither does.
//!
//! A loan is active while its status is BORROWED. return_date alone says
//! nothing about activity: a borrow may carry a planned return date from
//! day one.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowRecord, BorrowRecordDetails, BorrowStatus, UpdateBorrowRecord},
        member::MemberDetails,
    },
    repository::books::{book_details_from_row, BOOK_DETAILS_COLUMNS},
};

const RECORD_COLUMNS: &str = "id, book_id, member_id, borrow_date, return_date, status";

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book for a member.
    ///
    /// Preconditions, checked in order under the book row lock:
    /// 1. the member holds no active record for this book,
    /// 2. the book is available.
    pub async fn borrow(
        &self,
        book_id: i32,
        member_id: i32,
        planned_return: Option<DateTime<Utc>>,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let available: bool =
            sqlx::query_scalar("SELECT availability_status FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let already_borrowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrow_records
                WHERE book_id = $1 AND member_id = $2 AND status = 'BORROWED'
            )
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::AlreadyBorrowed(
                "You have already borrowed this book and not returned it yet.".to_string(),
            ));
        }
        if !available {
            return Err(AppError::NotAvailable(
                "This book is currently not available for borrowing.".to_string(),
            ));
        }

        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            r#"
            INSERT INTO borrow_records (book_id, member_id, borrow_date, return_date, status)
            VALUES ($1, $2, NOW(), $3, 'BORROWED')
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(book_id)
        .bind(member_id)
        .bind(planned_return)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET availability_status = FALSE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Return a borrowed book: close the member's active record in place
    /// and release the book, in one transaction.
    pub async fn return_borrow(&self, book_id: i32, member_id: i32) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        // Any planned return date is overwritten with the actual one
        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            r#"
            UPDATE borrow_records
            SET return_date = NOW(), status = 'RETURNED'
            WHERE book_id = $1 AND member_id = $2 AND status = 'BORROWED'
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(book_id)
        .bind(member_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NoActiveBorrow("No active borrow for this book.".to_string()))?;

        sqlx::query("UPDATE books SET availability_status = TRUE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Staff correction path. Applies field updates, and when the update
    /// sets return_date on a record that was active it also closes the
    /// loan and releases the book, mirroring the return operation.
    pub async fn update(&self, id: i32, update: &UpdateBorrowRecord) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, BorrowRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM borrow_records WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))?;

        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(current.book_id)
            .fetch_optional(&mut *tx)
            .await?;

        let was_active = current.status == BorrowStatus::Borrowed;
        let closes_loan = was_active && update.return_date.is_some();

        let new_status = if closes_loan {
            BorrowStatus::Returned
        } else {
            current.status
        };

        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            r#"
            UPDATE borrow_records
            SET borrow_date = COALESCE($1, borrow_date),
                return_date = COALESCE($2, return_date),
                status = $3
            WHERE id = $4
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(update.borrow_date)
        .bind(update.return_date)
        .bind(new_status)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if closes_loan {
            sqlx::query("UPDATE books SET availability_status = TRUE WHERE id = $1")
                .bind(current.book_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(record)
    }

    /// Get a raw borrow record by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM borrow_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }

    /// Get a borrow record by ID with nested book and member
    pub async fn get_details(&self, id: i32) -> AppResult<BorrowRecordDetails> {
        let row = sqlx::query(&details_query("WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))?;
        Ok(details_from_row(&row))
    }

    /// List all borrow records (staff view)
    pub async fn list_all(&self) -> AppResult<Vec<BorrowRecordDetails>> {
        let rows = sqlx::query(&details_query(""))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// List borrow records scoped to one member
    pub async fn list_for_member(&self, member_id: i32) -> AppResult<Vec<BorrowRecordDetails>> {
        let rows = sqlx::query(&details_query("WHERE r.member_id = $1"))
            .bind(member_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Delete a borrow record (staff correction). Deleting an active
    /// record releases the book; the availability invariant holds.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM borrow_records WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))?;

        let was_active = record.status == BorrowStatus::Borrowed;

        sqlx::query("DELETE FROM borrow_records WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if was_active {
            sqlx::query("UPDATE books SET availability_status = TRUE WHERE id = $1")
                .bind(record.book_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn details_query(filter: &str) -> String {
    format!(
        r#"
        SELECT r.id AS record_id, r.borrow_date, r.return_date, r.status,
               m.id AS m_id, m.user_id AS m_user_id, m.membership_date,
               u.username AS m_name, u.email AS m_email,
               {BOOK_DETAILS_COLUMNS}
        FROM borrow_records r
        JOIN books b ON r.book_id = b.id
        LEFT JOIN authors a ON b.author_id = a.id
        LEFT JOIN categories c ON b.category_id = c.id
        JOIN members m ON r.member_id = m.id
        JOIN users u ON m.user_id = u.id
        {filter}
        ORDER BY r.borrow_date DESC, r.id DESC
        "#
    )
}

fn details_from_row(row: &PgRow) -> BorrowRecordDetails {
    BorrowRecordDetails {
        id: row.get("record_id"),
        book: book_details_from_row(row),
        member: MemberDetails {
            id: row.get("m_id"),
            user_id: row.get("m_user_id"),
            name: row.get("m_name"),
            email: row.get("m_email"),
            membership_date: row.get("membership_date"),
        },
        borrow_date: row.get("borrow_date"),
        return_date: row.get("return_date"),
        status: row.get("status"),
    }
}
