//! Persistence contract implemented by every stored record type.
//!
//! # Responsibility
//! - Describe a record's table, key and data columns to the generic
//!   repository.
//! - Convert records to bound SQL values and back.
//!
//! # Invariants
//! - `KEY_COLUMNS` and `EntityKey::key_values` have the same length and
//!   order.
//! - Audit columns are never listed in `DATA_COLUMNS`; the repository owns
//!   them.
//! - `DELETION_COLUMN` is the only declaration of the soft-delete
//!   capability.

use crate::model::audit::{AuditStamp, DeletionStamp};
use crate::repo::entity_repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;
use std::fmt::{Debug, Display};

/// Audit columns present on every entity table, in select order.
pub const AUDIT_COLUMNS: &[&str] = &["created_at", "created_by", "updated_at"];

/// Identifier of one entity: a scalar or a composite key.
pub trait EntityKey: Clone + Debug + Display {
    /// Values bound to `Entity::KEY_COLUMNS`, in the same order.
    fn key_values(&self) -> Vec<Value>;
}

impl EntityKey for i64 {
    fn key_values(&self) -> Vec<Value> {
        vec![Value::Integer(*self)]
    }
}

/// A record type the generic repository can store.
pub trait Entity: Sized + 'static {
    type Id: EntityKey;

    /// Human-readable type name used in errors and log events.
    const NAME: &'static str;
    const TABLE: &'static str;
    const KEY_COLUMNS: &'static [&'static str];
    const DATA_COLUMNS: &'static [&'static str];
    /// Nullable deletion timestamp column; `Some` marks a soft type.
    const DELETION_COLUMN: Option<&'static str> = None;

    /// Current identity, `None` while a generated key is still unassigned.
    fn id(&self) -> Option<Self::Id>;

    /// Whether `save` should insert rather than update.
    ///
    /// Records with assigned keys are new until their audit stamp is
    /// persisted. A value kept across `hard_delete` still carries that stamp,
    /// so saving it again reports `NotFound`; reset `audit` to
    /// `AuditStamp::default()` to insert it anew.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Receives the store-generated rowid after an insert without key.
    fn assign_generated_id(&mut self, _rowid: i64) {}

    /// Values bound to `DATA_COLUMNS`, in the same order.
    fn data_values(&self) -> Vec<Value>;

    fn audit(&self) -> &AuditStamp;
    fn audit_mut(&mut self) -> &mut AuditStamp;

    /// Builds a record from a row selected with key, data and audit
    /// columns (plus the deletion column for soft types).
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// Domain checks applied before every write.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Columns callers may filter and sort on.
    fn is_known_column(column: &str) -> bool {
        Self::KEY_COLUMNS.contains(&column)
            || Self::DATA_COLUMNS.contains(&column)
            || AUDIT_COLUMNS.contains(&column)
    }
}

pub fn audit_from_row(row: &Row<'_>) -> RepoResult<AuditStamp> {
    Ok(AuditStamp {
        created_at: Some(row.get("created_at")?),
        created_by: Some(row.get("created_by")?),
        updated_at: row.get("updated_at")?,
    })
}

/// Reads the deletion stamp, treating an unselected column as "not
/// deleted" so soft types still load when the capability is disabled.
pub fn deletion_from_row(row: &Row<'_>, column: &str) -> RepoResult<DeletionStamp> {
    match row.get::<_, Option<i64>>(column) {
        Ok(deleted_at) => Ok(DeletionStamp { deleted_at }),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(DeletionStamp::default()),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn audit_values(audit: &AuditStamp) -> Vec<Value> {
    vec![
        audit.created_at.map_or(Value::Null, Value::Integer),
        audit
            .created_by
            .clone()
            .map_or(Value::Null, Value::Text),
        audit.updated_at.map_or(Value::Null, Value::Integer),
    ]
}
