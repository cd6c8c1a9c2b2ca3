//! Sales transaction use-case service.
//!
//! # Responsibility
//! - Price transaction lines from the current catalog.
//! - Persist the header and its lines in one transaction.
//!
//! # Invariants
//! - Line price is unit price times quantity at the time of sale.
//! - Header totals are the sums of the stored lines.
//! - Lines for books that are absent or logically deleted are skipped.

use crate::model::audit::now_epoch_ms;
use crate::model::book::{Book, BookId};
use crate::model::transaction::{Transaction, TransactionDetail, TransactionId};
use crate::repo::entity::Entity;
use crate::repo::entity_repo::{RepoError, RepoResult, Repository, SqliteRepository};
use crate::repo::predicate::Predicate;
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// One requested book line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetailRequest {
    pub book_id: BookId,
    pub qty: i64,
}

/// Request model for recording a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub customer_name: String,
    pub details: Vec<TransactionDetailRequest>,
}

/// A stored transaction with the lines that were priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub details: Vec<TransactionDetail>,
}

/// Use-case service for sales transactions.
pub struct TransactionService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> TransactionService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Prices and stores a transaction.
    ///
    /// # Errors
    /// - `Validation` when a quantity is not positive or a total overflows.
    /// - `Db` when a line repeats a book (composite key conflict).
    pub fn create_transaction(
        &mut self,
        request: &TransactionRequest,
    ) -> RepoResult<TransactionReceipt> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let books = SqliteRepository::<Book>::try_new(&tx)?;
        let transactions = SqliteRepository::<Transaction>::try_new(&tx)?;
        let details = SqliteRepository::<TransactionDetail>::try_new(&tx)?;

        let mut priced: Vec<(BookId, i64, i64)> = Vec::with_capacity(request.details.len());
        for line in &request.details {
            let Some(book) = books.find_one(&line.book_id)? else {
                warn!(
                    "event=transaction_create module=service status=skipped book_id={} reason=book_not_found",
                    line.book_id
                );
                continue;
            };
            let price = book
                .price
                .checked_mul(line.qty)
                .ok_or_else(|| overflow("line price"))?;
            priced.push((line.book_id, line.qty, price));
        }

        let mut transaction = Transaction::new(request.customer_name.trim(), now_epoch_ms());
        transaction.total_price = checked_sum(priced.iter().map(|(_, _, price)| *price))
            .ok_or_else(|| overflow("total_price"))?;
        transaction.total_qty = checked_sum(priced.iter().map(|(_, qty, _)| *qty))
            .ok_or_else(|| overflow("total_qty"))?;
        let transaction = transactions.save(transaction)?;
        let transaction_id = transaction
            .id
            .ok_or(RepoError::MissingIdentity(Transaction::NAME))?;

        let mut stored = Vec::with_capacity(priced.len());
        for (book_id, qty, price) in priced {
            stored.push(details.save(TransactionDetail::new(transaction_id, book_id, qty, price))?);
        }
        tx.commit()?;

        info!(
            "event=transaction_create module=service status=ok transaction_id={} lines={} total_price={} total_qty={}",
            transaction_id,
            stored.len(),
            transaction.total_price,
            transaction.total_qty
        );
        Ok(TransactionReceipt {
            transaction,
            details: stored,
        })
    }

    /// Loads one transaction header.
    pub fn get_transaction(&self, transaction_id: TransactionId) -> RepoResult<Transaction> {
        SqliteRepository::<Transaction>::try_new(&*self.conn)?
            .find_one(&transaction_id)?
            .ok_or_else(|| RepoError::not_found::<Transaction>(&transaction_id))
    }

    /// Lists the lines of one transaction in book order.
    pub fn get_transaction_details(
        &self,
        transaction_id: TransactionId,
    ) -> RepoResult<Vec<TransactionDetail>> {
        let predicate = Predicate::eq::<TransactionDetail>("transaction_id", transaction_id)?;
        SqliteRepository::<TransactionDetail>::try_new(&*self.conn)?.find_all_matching(predicate)
    }
}

fn checked_sum(mut values: impl Iterator<Item = i64>) -> Option<i64> {
    values.try_fold(0_i64, |total, value| total.checked_add(value))
}

fn overflow(field: &str) -> RepoError {
    RepoError::Validation {
        entity: Transaction::NAME,
        message: format!("{field} overflows"),
    }
}
