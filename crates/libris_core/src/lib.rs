//! Core catalog and transaction logic for libris.
//! This crate owns soft-delete semantics and every persistence invariant.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LibrisConfig};
pub use db::{open_db, open_db_in_memory, open_store, DbError, DbResult, StoreLocation};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::audit::{AuditStamp, DeletionStamp, DEFAULT_CREATOR};
pub use model::author::{Author, AuthorId};
pub use model::book::{Book, BookDetail, BookId};
pub use model::transaction::{Transaction, TransactionDetail, TransactionDetailId, TransactionId};
pub use repo::capability::{cached_capability, supports_soft_delete};
pub use repo::entity::{Entity, EntityKey};
pub use repo::entity_repo::{RepoError, RepoResult, Repository, SqliteRepository};
pub use repo::paging::{Direction, Order, Page, PageRequest, Sort};
pub use repo::predicate::Predicate;
pub use service::author_service::{AuthorRequest, AuthorService};
pub use service::book_service::{BookRequest, BookService, CatalogBook};
pub use service::transaction_service::{
    TransactionDetailRequest, TransactionReceipt, TransactionRequest, TransactionService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
