//! Book use-case service.
//!
//! # Responsibility
//! - Create books together with their detail record.
//! - Cascade book deletion to the detail record.
//!
//! # Invariants
//! - A book is only created for a visible author.
//! - Book and detail are written and deleted in one transaction: either
//!   both change or neither does.

use crate::model::author::{Author, AuthorId};
use crate::model::book::{Book, BookDetail, BookId};
use crate::repo::entity::Entity;
use crate::repo::entity_repo::{RepoError, RepoResult, Repository, SqliteRepository};
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Request model for adding a book to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRequest {
    pub author_id: AuthorId,
    pub title: String,
    pub price: i64,
    pub page: i64,
    pub weight: i64,
}

/// A stored book together with its detail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBook {
    #[serde(flatten)]
    pub book: Book,
    pub detail: BookDetail,
}

/// Use-case service for catalog books.
pub struct BookService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> BookService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Adds a book and its detail for an existing, visible author.
    ///
    /// # Errors
    /// - `NotFound` when the author is absent or logically deleted.
    /// - `Validation` when book or detail fields are out of range.
    pub fn add_book(&mut self, request: &BookRequest) -> RepoResult<CatalogBook> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let authors = SqliteRepository::<Author>::try_new(&tx)?;
        let books = SqliteRepository::<Book>::try_new(&tx)?;
        let details = SqliteRepository::<BookDetail>::try_new(&tx)?;

        if authors.find_one(&request.author_id)?.is_none() {
            warn!(
                "event=book_add module=service status=not_found author_id={}",
                request.author_id
            );
            return Err(RepoError::not_found::<Author>(&request.author_id));
        }

        let book = books.save(Book::new(
            request.author_id,
            request.title.trim(),
            request.price,
        ))?;
        let book_id = book.id.ok_or(RepoError::MissingIdentity(Book::NAME))?;
        let detail = details.save(BookDetail::new(book_id, request.page, request.weight))?;
        tx.commit()?;

        info!(
            "event=book_add module=service status=ok book_id={} author_id={}",
            book_id, request.author_id
        );
        Ok(CatalogBook { book, detail })
    }

    /// Lists every visible book.
    pub fn get_all_books(&self) -> RepoResult<Vec<Book>> {
        SqliteRepository::<Book>::try_new(&*self.conn)?.find_all()
    }

    /// Loads the visible detail of one book.
    pub fn get_book_detail(&self, book_id: BookId) -> RepoResult<BookDetail> {
        SqliteRepository::<BookDetail>::try_new(&*self.conn)?
            .find_one(&book_id)?
            .ok_or_else(|| RepoError::not_found::<BookDetail>(&book_id))
    }

    /// Deletes a book and its detail.
    ///
    /// The detail goes first; a `NotFound` on either record rolls back both.
    pub fn delete_book(&mut self, book_id: BookId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let books = SqliteRepository::<Book>::try_new(&tx)?;
        let details = SqliteRepository::<BookDetail>::try_new(&tx)?;

        let result = details.delete(&book_id).and_then(|()| books.delete(&book_id));
        if let Err(err) = result {
            warn!("event=book_delete module=service status=error book_id={book_id} error={err}");
            return Err(err);
        }
        tx.commit()?;

        info!("event=book_delete module=service status=ok book_id={book_id}");
        Ok(())
    }

    /// Changes the price of a visible book and returns the updated record.
    pub fn update_price(&mut self, book_id: BookId, price: i64) -> RepoResult<Book> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let books = SqliteRepository::<Book>::try_new(&tx)?;

        let mut book = books
            .find_one(&book_id)?
            .ok_or_else(|| RepoError::not_found::<Book>(&book_id))?;
        book.price = price;
        let book = books.save(book)?;
        tx.commit()?;

        info!("event=book_update_price module=service status=ok book_id={book_id} price={price}");
        Ok(book)
    }
}
