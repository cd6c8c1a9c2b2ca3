//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into catalog/transaction use-cases.
//! - Scope multi-record writes into one SQLite transaction.
//!
//! # Invariants
//! - Services never branch on whether a record type is soft-deletable; the
//!   generic repository owns that decision.

pub mod author_service;
pub mod book_service;
pub mod transaction_service;
