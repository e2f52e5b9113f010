//! Data models for BookHeaven

pub mod author;
pub mod book;
pub mod borrow;
pub mod category;
pub mod image;
pub mod member;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookDetails};
pub use borrow::{BorrowRecord, BorrowRecordDetails, BorrowStatus};
pub use category::{Category, CategoryDetails};
pub use image::BookImage;
pub use member::{Member, MemberDetails};
pub use user::{Role, UserClaims};
