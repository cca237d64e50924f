//! Business logic services

pub mod books;
pub mod storage;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
}

impl Services {
    /// Create all services with the given repository and object store
    pub fn new(repository: Repository, storage: storage::StorageService) -> Self {
        Self {
            books: books::BooksService::new(repository, storage),
        }
    }
}
