//! Static per-action permission table.
//!
//! Every resource maps each action to the role it requires; handlers call
//! [`check`] once before dispatching into the service layer. There is no
//! per-endpoint policy logic anywhere else.

use crate::error::{AppError, AppResult};
use crate::models::user::UserClaims;

/// API resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Books,
    Authors,
    Categories,
    Members,
    BorrowRecords,
    BookImages,
}

/// Actions a caller can perform on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
    Borrow,
    Return,
}

/// Minimum access level an action demands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequiredRole {
    Public,
    Authenticated,
    Admin,
}

/// The permission table: {resource, action} -> required role.
pub fn required_role(resource: Resource, action: Action) -> RequiredRole {
    use Action::*;
    use RequiredRole::*;
    use Resource::*;

    match (resource, action) {
        // Catalog resources are world-readable, admin-writable
        (Books | Authors | Categories, List | Retrieve) => Public,
        (Books | Authors | Categories, Create | Update | Delete) => Admin,
        (Books, Borrow | Return) => Authenticated,

        (BookImages, List | Retrieve) => Public,
        (BookImages, Create | Update | Delete) => Admin,

        // Member listing exposes other people's profiles
        (Members, List) => Admin,
        (Members, Retrieve) => Authenticated,
        (Members, Create | Update | Delete) => Admin,

        // Borrow records are read-scoped to the caller in the service
        // layer; mutation is a staff correction path
        (BorrowRecords, List | Retrieve) => Authenticated,
        (BorrowRecords, Create | Update | Delete) => Admin,

        // Borrow/return only exist on books
        (_, Borrow | Return) => Admin,
    }
}

/// Check a (possibly anonymous) caller against the table.
pub fn check(claims: Option<&UserClaims>, resource: Resource, action: Action) -> AppResult<()> {
    match required_role(resource, action) {
        RequiredRole::Public => Ok(()),
        RequiredRole::Authenticated => {
            if claims.is_some() {
                Ok(())
            } else {
                Err(AppError::Authentication(
                    "Authentication required".to_string(),
                ))
            }
        }
        RequiredRole::Admin => match claims {
            None => Err(AppError::Authentication(
                "Authentication required".to_string(),
            )),
            Some(c) if c.is_admin() => Ok(()),
            Some(_) => Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn claims(role: Role) -> UserClaims {
        UserClaims {
            sub: "test".to_string(),
            user_id: 1,
            role,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn catalog_reads_are_public() {
        assert!(check(None, Resource::Books, Action::List).is_ok());
        assert!(check(None, Resource::Authors, Action::Retrieve).is_ok());
        assert!(check(None, Resource::Categories, Action::List).is_ok());
    }

    #[test]
    fn catalog_writes_need_admin() {
        assert!(check(None, Resource::Books, Action::Create).is_err());
        assert!(check(Some(&claims(Role::Member)), Resource::Books, Action::Create).is_err());
        assert!(check(Some(&claims(Role::Admin)), Resource::Books, Action::Create).is_ok());
    }

    #[test]
    fn borrow_needs_authentication_only() {
        assert!(check(None, Resource::Books, Action::Borrow).is_err());
        assert!(check(Some(&claims(Role::Member)), Resource::Books, Action::Borrow).is_ok());
        assert!(check(Some(&claims(Role::Member)), Resource::Books, Action::Return).is_ok());
    }

    #[test]
    fn member_listing_is_admin_only() {
        assert!(check(Some(&claims(Role::Member)), Resource::Members, Action::List).is_err());
        assert!(check(Some(&claims(Role::Admin)), Resource::Members, Action::List).is_ok());
        assert!(check(Some(&claims(Role::Member)), Resource::Members, Action::Retrieve).is_ok());
    }

    #[test]
    fn borrow_record_corrections_are_admin_only() {
        assert!(
            check(Some(&claims(Role::Member)), Resource::BorrowRecords, Action::Update).is_err()
        );
        assert!(check(Some(&claims(Role::Admin)), Resource::BorrowRecords, Action::Update).is_ok());
        assert!(check(Some(&claims(Role::Member)), Resource::BorrowRecords, Action::List).is_ok());
    }
}
