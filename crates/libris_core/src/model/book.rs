//! Book and book detail master records.
//!
//! # Invariants
//! - A book detail shares its key with the book it describes.
//! - `price` is a non-negative amount in the smallest currency unit.

use crate::model::audit::{AuditStamp, DeletionStamp};
use crate::model::author::AuthorId;
use serde::{Deserialize, Serialize};

pub type BookId = i64;

/// Catalog book. Soft-deletable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Generated by the store on first save.
    pub id: Option<BookId>,
    pub author_id: AuthorId,
    pub title: String,
    pub price: i64,
    #[serde(flatten)]
    pub audit: AuditStamp,
    #[serde(skip)]
    pub deletion: DeletionStamp,
}

impl Book {
    pub fn new(author_id: AuthorId, title: impl Into<String>, price: i64) -> Self {
        Self {
            id: None,
            author_id,
            title: title.into(),
            price,
            audit: AuditStamp::default(),
            deletion: DeletionStamp::default(),
        }
    }
}

/// Physical attributes of one book. Soft-deletable.
///
/// The key is assigned by the caller (the owning book id), so a detail is
/// new until the repository has stamped its audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetail {
    pub book_id: BookId,
    pub page: i64,
    pub weight: i64,
    #[serde(flatten)]
    pub audit: AuditStamp,
    #[serde(skip)]
    pub deletion: DeletionStamp,
}

impl BookDetail {
    pub fn new(book_id: BookId, page: i64, weight: i64) -> Self {
        Self {
            book_id,
            page,
            weight,
            audit: AuditStamp::default(),
            deletion: DeletionStamp::default(),
        }
    }
}
