//! Business logic services

pub mod borrows;
pub mod catalog;
pub mod members;

use crate::{config::StorageConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub borrows: borrows::BorrowsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, storage: StorageConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), storage),
            members: members::MembersService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository),
        }
    }
}
