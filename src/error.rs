//! Error types for BookHeaven server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes surfaced in error response bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchRecord = 4,
    Duplicate = 5,
    NotAvailable = 6,
    AlreadyBorrowed = 7,
    NoActiveBorrow = 8,
    BadValue = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Return attempted with no active loan for (book, member)
    #[error("Not found: {0}")]
    NoActiveBorrow(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Duplicate name/title/ISBN on create
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Member already holds an active loan for this book
    #[error("Conflict: {0}")]
    AlreadyBorrowed(String),

    /// Book is out on loan to someone
    #[error("Conflict: {0}")]
    NotAvailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Error code reported in the response body. The workflow failures
    /// have dedicated variants so clients can distinguish a double-borrow
    /// from a duplicate name without parsing the message text.
    fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) | AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NoSuchRecord,
            AppError::NoActiveBorrow(_) => ErrorCode::NoActiveBorrow,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::AlreadyBorrowed(_) => ErrorCode::AlreadyBorrowed,
            AppError::NotAvailable(_) => ErrorCode::NotAvailable,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) | AppError::NoActiveBorrow(msg) => {
                (StatusCode::NOT_FOUND, msg.clone())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Conflict(msg)
            | AppError::AlreadyBorrowed(msg)
            | AppError::NotAvailable(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_codes_distinguish_workflow_failures() {
        let double = AppError::AlreadyBorrowed(
            "You have already borrowed this book and not returned it yet.".to_string(),
        );
        assert_eq!(double.code(), ErrorCode::AlreadyBorrowed);

        let unavailable = AppError::NotAvailable(
            "This book is currently not available for borrowing.".to_string(),
        );
        assert_eq!(unavailable.code(), ErrorCode::NotAvailable);

        let dup = AppError::Conflict("Author with this name already exists.".to_string());
        assert_eq!(dup.code(), ErrorCode::Duplicate);
    }

    #[test]
    fn not_found_codes() {
        let no_borrow = AppError::NoActiveBorrow("No active borrow for this book.".to_string());
        assert_eq!(no_borrow.code(), ErrorCode::NoActiveBorrow);

        let no_record = AppError::NotFound("Book with id 7 not found".to_string());
        assert_eq!(no_record.code(), ErrorCode::NoSuchRecord);
    }

    #[test]
    fn workflow_conflicts_map_to_409() {
        use axum::response::IntoResponse;
        let response =
            AppError::NotAvailable("This book is currently not available for borrowing.".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response =
            AppError::NoActiveBorrow("No active borrow for this book.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
