//! Table mappings for the catalog and transaction records.
//!
//! # Invariants
//! - Column lists match `0001_init.sql`.
//! - Master tables (`m_*`) declare `deleted_at`; transaction tables (`t_*`)
//!   do not.

use crate::model::audit::AuditStamp;
use crate::model::author::{Author, AuthorId};
use crate::model::book::{Book, BookDetail, BookId};
use crate::model::transaction::{
    Transaction, TransactionDetail, TransactionDetailId, TransactionId,
};
use crate::repo::entity::{audit_from_row, deletion_from_row, Entity, EntityKey};
use crate::repo::entity_repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;

const DELETED_AT: &str = "deleted_at";

impl Entity for Author {
    type Id = AuthorId;

    const NAME: &'static str = "author";
    const TABLE: &'static str = "m_author";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const DATA_COLUMNS: &'static [&'static str] = &["full_name"];
    const DELETION_COLUMN: Option<&'static str> = Some(DELETED_AT);

    fn id(&self) -> Option<AuthorId> {
        self.id
    }

    fn assign_generated_id(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn data_values(&self) -> Vec<Value> {
        vec![Value::Text(self.full_name.clone())]
    }

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            full_name: row.get("full_name")?,
            audit: audit_from_row(row)?,
            deletion: deletion_from_row(row, DELETED_AT)?,
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("full_name must not be blank".to_string());
        }
        Ok(())
    }
}

impl Entity for Book {
    type Id = BookId;

    const NAME: &'static str = "book";
    const TABLE: &'static str = "m_book";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const DATA_COLUMNS: &'static [&'static str] = &["author_id", "title", "price"];
    const DELETION_COLUMN: Option<&'static str> = Some(DELETED_AT);

    fn id(&self) -> Option<BookId> {
        self.id
    }

    fn assign_generated_id(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.author_id),
            Value::Text(self.title.clone()),
            Value::Integer(self.price),
        ]
    }

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            author_id: row.get("author_id")?,
            title: row.get("title")?,
            price: row.get("price")?,
            audit: audit_from_row(row)?,
            deletion: deletion_from_row(row, DELETED_AT)?,
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be blank".to_string());
        }
        if self.price < 0 {
            return Err(format!("price must not be negative, got {}", self.price));
        }
        Ok(())
    }
}

impl Entity for BookDetail {
    type Id = BookId;

    const NAME: &'static str = "book_detail";
    const TABLE: &'static str = "m_book_detail";
    const KEY_COLUMNS: &'static [&'static str] = &["book_id"];
    const DATA_COLUMNS: &'static [&'static str] = &["page", "weight"];
    const DELETION_COLUMN: Option<&'static str> = Some(DELETED_AT);

    fn id(&self) -> Option<BookId> {
        Some(self.book_id)
    }

    fn is_new(&self) -> bool {
        !self.audit.is_persisted()
    }

    fn data_values(&self) -> Vec<Value> {
        vec![Value::Integer(self.page), Value::Integer(self.weight)]
    }

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            book_id: row.get("book_id")?,
            page: row.get("page")?,
            weight: row.get("weight")?,
            audit: audit_from_row(row)?,
            deletion: deletion_from_row(row, DELETED_AT)?,
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.page <= 0 {
            return Err(format!("page must be positive, got {}", self.page));
        }
        if self.weight < 0 {
            return Err(format!("weight must not be negative, got {}", self.weight));
        }
        Ok(())
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    const NAME: &'static str = "transaction";
    const TABLE: &'static str = "t_transaction";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const DATA_COLUMNS: &'static [&'static str] = &[
        "customer_name",
        "transaction_date",
        "total_price",
        "total_qty",
    ];

    fn id(&self) -> Option<TransactionId> {
        self.id
    }

    fn assign_generated_id(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.customer_name.clone()),
            Value::Integer(self.transaction_date),
            Value::Integer(self.total_price),
            Value::Integer(self.total_qty),
        ]
    }

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            customer_name: row.get("customer_name")?,
            transaction_date: row.get("transaction_date")?,
            total_price: row.get("total_price")?,
            total_qty: row.get("total_qty")?,
            audit: audit_from_row(row)?,
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.customer_name.trim().is_empty() {
            return Err("customer_name must not be blank".to_string());
        }
        if self.total_price < 0 || self.total_qty < 0 {
            return Err("totals must not be negative".to_string());
        }
        Ok(())
    }
}

impl EntityKey for TransactionDetailId {
    fn key_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.transaction_id),
            Value::Integer(self.book_id),
        ]
    }
}

impl Entity for TransactionDetail {
    type Id = TransactionDetailId;

    const NAME: &'static str = "transaction_detail";
    const TABLE: &'static str = "t_transaction_detail";
    const KEY_COLUMNS: &'static [&'static str] = &["transaction_id", "book_id"];
    const DATA_COLUMNS: &'static [&'static str] = &["qty", "price"];

    fn id(&self) -> Option<TransactionDetailId> {
        Some(self.key())
    }

    fn is_new(&self) -> bool {
        !self.audit.is_persisted()
    }

    fn data_values(&self) -> Vec<Value> {
        vec![Value::Integer(self.qty), Value::Integer(self.price)]
    }

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            transaction_id: row.get("transaction_id")?,
            book_id: row.get("book_id")?,
            qty: row.get("qty")?,
            price: row.get("price")?,
            audit: audit_from_row(row)?,
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.qty <= 0 {
            return Err(format!("qty must be positive, got {}", self.qty));
        }
        if self.price < 0 {
            return Err(format!("price must not be negative, got {}", self.price));
        }
        Ok(())
    }
}
