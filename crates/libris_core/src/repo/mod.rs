//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one generic data access contract for every record type.
//! - Isolate SQLite query details from service/business orchestration.
//! - Apply soft-delete semantics transparently per entity type.
//!
//! # Invariants
//! - Repository writes must enforce `Entity::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Logically deleted rows are invisible to every read.

pub mod capability;
pub mod entity;
pub mod entity_repo;
mod mapping;
pub mod paging;
pub mod predicate;
mod schema;
