//! Member model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Member model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i32,
    /// One-to-one reference into the identity service's users table
    pub user_id: i32,
    /// Set at creation, immutable thereafter
    pub membership_date: DateTime<Utc>,
}

/// Member read shape with name and email resolved from the linked identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberDetails {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub membership_date: DateTime<Utc>,
}

/// Create member request
#[derive(Debug, Deserialize)]
pub struct CreateMember {
    pub user_id: i32,
}

/// Update member request. membership_date is server-set and cannot
/// be changed; only the identity link may be corrected.
#[derive(Debug, Deserialize)]
pub struct UpdateMember {
    pub user_id: Option<i32>,
}
