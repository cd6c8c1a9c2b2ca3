//! Author master record.

use crate::model::audit::{AuditStamp, DeletionStamp};
use serde::{Deserialize, Serialize};

pub type AuthorId = i64;

/// Book author. Soft-deletable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Generated by the store on first save.
    pub id: Option<AuthorId>,
    pub full_name: String,
    #[serde(flatten)]
    pub audit: AuditStamp,
    #[serde(skip)]
    pub deletion: DeletionStamp,
}

impl Author {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            audit: AuditStamp::default(),
            deletion: DeletionStamp::default(),
        }
    }
}
