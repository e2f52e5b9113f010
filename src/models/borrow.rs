//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::book::BookDetails;
use super::member::MemberDetails;

/// Loan state of a borrow record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "VARCHAR", rename_all = "UPPERCASE")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
}

/// Borrow record model from database.
///
/// Invariant: at most one record per book may be in Borrowed state at any
/// time; the owning book's availability_status is false exactly while such
/// a record exists. An active record may carry a planned return_date set
/// at borrow time; the return overwrites it with the actual date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BorrowRecord {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
}

/// Borrow record read shape with nested book and member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowRecordDetails {
    pub id: i32,
    pub book: BookDetails,
    pub member: MemberDetails,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
}

/// Borrow request body (all fields optional; the acting member comes
/// from the authenticated identity)
#[derive(Debug, Default, Deserialize)]
pub struct BorrowRequest {
    /// Planned return date, recorded on the new record as-is
    pub return_date: Option<DateTime<Utc>>,
}

/// Generic update request for staff corrections. Setting return_date on
/// an active record closes the loan and releases the book, exactly as
/// the return operation would.
#[derive(Debug, Deserialize)]
pub struct UpdateBorrowRecord {
    pub borrow_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&BorrowStatus::Borrowed).unwrap(),
            "\"BORROWED\""
        );
        assert_eq!(
            serde_json::to_string(&BorrowStatus::Returned).unwrap(),
            "\"RETURNED\""
        );
    }

    #[test]
    fn status_round_trips() {
        let s: BorrowStatus = serde_json::from_str("\"RETURNED\"").unwrap();
        assert_eq!(s, BorrowStatus::Returned);
    }
}
