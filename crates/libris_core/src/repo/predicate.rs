//! Composable query predicates.
//!
//! # Responsibility
//! - Build `WHERE` fragments and their bound values for the generic
//!   repository.
//!
//! # Invariants
//! - Column names only ever come from entity declarations; caller input is
//!   bound as a value, never spliced into SQL.
//! - Only conjunctions exist, so composition is associative and the empty
//!   predicate is its identity.

use crate::repo::entity::{Entity, EntityKey};
use crate::repo::entity_repo::{RepoError, RepoResult};
use rusqlite::types::Value;

/// A conjunction of SQL conditions with positional parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Predicate {
    /// Predicate matching every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Equality on each key column of `E`.
    pub fn by_id<E: Entity>(id: &E::Id) -> Self {
        let values = id.key_values();
        debug_assert_eq!(values.len(), E::KEY_COLUMNS.len());

        Self {
            clauses: E::KEY_COLUMNS
                .iter()
                .map(|column| format!("{column} = ?"))
                .collect(),
            values,
        }
    }

    /// Rows of `E` whose deletion timestamp is null.
    ///
    /// Returns `None` for entity types without a deletion column.
    pub fn not_deleted<E: Entity>() -> Option<Self> {
        E::DELETION_COLUMN.map(|column| Self {
            clauses: vec![format!("{column} IS NULL")],
            values: Vec::new(),
        })
    }

    /// Equality on one declared column of `E`.
    pub fn eq<E: Entity>(column: &str, value: impl Into<Value>) -> RepoResult<Self> {
        if !E::is_known_column(column) {
            return Err(RepoError::UnknownColumn {
                entity: E::NAME,
                column: column.to_string(),
            });
        }

        Ok(Self {
            clauses: vec![format!("{column} = ?")],
            values: vec![value.into()],
        })
    }

    /// Logical AND of both predicates.
    pub fn and(mut self, other: Predicate) -> Self {
        self.clauses.extend(other.clauses);
        self.values.extend(other.values);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// ` WHERE ...` fragment, or an empty string for the empty predicate.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", self.clauses.join(" AND "))
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}
