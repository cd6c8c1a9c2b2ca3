//! Catalog and transaction domain model.
//!
//! # Responsibility
//! - Define the plain records persisted by the repository layer.
//! - Embed audit and deletion metadata by composition, so "can be
//!   soft-deleted" is a structural fact of a record type.
//!
//! # Invariants
//! - Audit and deletion stamps are written by the repository, never by
//!   callers.
//! - Master data (authors, books, book details) carries a deletion stamp;
//!   transactional records do not.

pub mod audit;
pub mod author;
pub mod book;
pub mod transaction;
