//! Sales transaction records.
//!
//! Transactions are permanent business records: they carry audit metadata
//! but no deletion stamp, so deleting one removes the row.

use crate::model::audit::AuditStamp;
use crate::model::book::BookId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type TransactionId = i64;

/// Sales transaction header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Generated by the store on first save.
    pub id: Option<TransactionId>,
    pub customer_name: String,
    /// Epoch milliseconds.
    pub transaction_date: i64,
    pub total_price: i64,
    pub total_qty: i64,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl Transaction {
    pub fn new(customer_name: impl Into<String>, transaction_date: i64) -> Self {
        Self {
            id: None,
            customer_name: customer_name.into(),
            transaction_date,
            total_price: 0,
            total_qty: 0,
            audit: AuditStamp::default(),
        }
    }
}

/// Composite key of a transaction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionDetailId {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
}

impl Display for TransactionDetailId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.transaction_id, self.book_id)
    }
}

/// One book line of a transaction. `price` is the line total (unit price
/// times `qty`), stored as computed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub qty: i64,
    pub price: i64,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl TransactionDetail {
    pub fn new(transaction_id: TransactionId, book_id: BookId, qty: i64, price: i64) -> Self {
        Self {
            transaction_id,
            book_id,
            qty,
            price,
            audit: AuditStamp::default(),
        }
    }

    pub fn key(&self) -> TransactionDetailId {
        TransactionDetailId {
            transaction_id: self.transaction_id,
            book_id: self.book_id,
        }
    }
}
