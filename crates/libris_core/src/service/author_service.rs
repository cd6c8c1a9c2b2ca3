//! Author use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for author maintenance.
//! - Delegate persistence to any `Repository<Author>` implementation.

use crate::model::author::{Author, AuthorId};
use crate::repo::entity_repo::{RepoError, RepoResult, Repository};
use log::info;
use serde::{Deserialize, Serialize};

/// Request model for registering an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRequest {
    pub full_name: String,
}

/// Use-case service wrapper for author operations.
pub struct AuthorService<R: Repository<Author>> {
    repo: R,
}

impl<R: Repository<Author>> AuthorService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new author and returns the stored record.
    pub fn save(&self, request: &AuthorRequest) -> RepoResult<Author> {
        let author = self.repo.save(Author::new(request.full_name.trim()))?;
        info!(
            "event=author_save module=service status=ok author_id={}",
            author.id.unwrap_or_default()
        );
        Ok(author)
    }

    /// Lists every visible author.
    pub fn get_all(&self) -> RepoResult<Vec<Author>> {
        self.repo.find_all()
    }

    /// Loads one visible author or reports `NotFound`.
    pub fn get_author(&self, id: AuthorId) -> RepoResult<Author> {
        self.repo
            .find_one(&id)?
            .ok_or_else(|| RepoError::not_found::<Author>(&id))
    }

    /// Logically deletes an author. Books keep referencing the row.
    pub fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        self.repo.delete(&id)?;
        info!("event=author_delete module=service status=ok author_id={id}");
        Ok(())
    }
}
