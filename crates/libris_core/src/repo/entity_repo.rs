//! Generic soft-delete-aware repository over any `Entity`.
//!
//! # Responsibility
//! - Provide find/save/delete/hard-delete for every record type with one
//!   implementation.
//! - Hide soft-delete semantics from callers: deleted rows never appear in
//!   reads, and `delete` becomes a timestamp update for soft types.
//!
//! # Invariants
//! - The capability is consulted on every operation through the registry.
//! - `delete` is a single conditional statement guarded by the visibility
//!   predicate; a second delete of the same id reports `NotFound` and keeps
//!   the first deletion timestamp.
//! - Audit stamps are written in the same statement as the mutation.
//! - Write paths call `Entity::validate()` before SQL mutations.
//! - Mutations run on the caller's connection or transaction; this layer
//!   never opens transactions itself.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::audit::now_epoch_ms;
use crate::repo::capability::supports_soft_delete;
use crate::repo::entity::{audit_values, Entity, EntityKey, AUDIT_COLUMNS};
use crate::repo::paging::{Page, PageRequest, Sort};
use crate::repo::predicate::Predicate;
use crate::repo::schema::{table_exists, table_has_column};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Transport or integrity failure reported by SQLite, unchanged.
    Db(DbError),
    /// Identifier has no currently visible row.
    NotFound { entity: &'static str, id: String },
    /// Operation needs an identity the record does not have yet.
    MissingIdentity(&'static str),
    /// Record failed its domain checks before any SQL ran.
    Validation {
        entity: &'static str,
        message: String,
    },
    /// Filter or sort referenced a column the entity does not declare.
    UnknownColumn {
        entity: &'static str,
        column: String,
    },
    InvalidPageRequest(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found<E: Entity>(id: &E::Id) -> Self {
        Self::NotFound {
            entity: E::NAME,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the store rejected a write on an integrity rule, such as a
    /// book referencing a missing author.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Db(err) => err.is_constraint_violation(),
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::MissingIdentity(entity) => write!(f, "{entity} has no identity"),
            Self::Validation { entity, message } => write!(f, "invalid {entity}: {message}"),
            Self::UnknownColumn { entity, column } => {
                write!(f, "{entity} has no column `{column}`")
            }
            Self::InvalidPageRequest(message) => write!(f, "invalid page request: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface shared by every entity type.
pub trait Repository<E: Entity> {
    /// All visible records in key order.
    fn find_all(&self) -> RepoResult<Vec<E>>;
    /// All visible records in caller order, ties broken by key.
    fn find_all_sorted(&self, sort: &Sort) -> RepoResult<Vec<E>>;
    /// One window of visible records; the total counts visible rows only.
    fn find_all_paged(&self, request: &PageRequest) -> RepoResult<Page<E>>;
    /// Visible records matching an additional caller predicate.
    fn find_all_matching(&self, predicate: Predicate) -> RepoResult<Vec<E>>;
    /// One visible record; `None` when absent or logically deleted.
    fn find_one(&self, id: &E::Id) -> RepoResult<Option<E>>;
    fn count(&self) -> RepoResult<u64>;
    /// Inserts a new record or updates an existing one, stamping audit
    /// fields, and returns the stored record.
    fn save(&self, entity: E) -> RepoResult<E>;
    /// Logically deletes (soft types) or removes (hard types) one record.
    fn delete(&self, id: &E::Id) -> RepoResult<()>;
    fn delete_entity(&self, entity: &E) -> RepoResult<()>;
    /// Removes the physical row regardless of capability or prior state.
    fn hard_delete(&self, entity: &E) -> RepoResult<()>;
}

/// SQLite-backed generic repository.
pub struct SqliteRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> E>,
}

impl<'conn, E: Entity> SqliteRepository<'conn, E> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Accepts a `rusqlite::Transaction` through deref, which is how callers
    /// scope several writes into one unit of work.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_entity_connection_ready::<E>(conn)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    /// Whether deletes on this repository are logical.
    pub fn soft_delete_enabled(&self) -> bool {
        supports_soft_delete::<E>(self.conn)
    }

    fn visibility(&self, soft: bool) -> Predicate {
        if soft {
            Predicate::not_deleted::<E>().unwrap_or_default()
        } else {
            Predicate::all()
        }
    }

    fn select_sql(&self, soft: bool) -> String {
        let mut columns: Vec<&str> = Vec::new();
        columns.extend_from_slice(E::KEY_COLUMNS);
        columns.extend_from_slice(E::DATA_COLUMNS);
        columns.extend_from_slice(AUDIT_COLUMNS);
        if soft {
            columns.extend(E::DELETION_COLUMN);
        }
        format!("SELECT {} FROM {}", columns.join(", "), E::TABLE)
    }

    fn query(
        &self,
        predicate: Predicate,
        sort: &Sort,
        window: Option<(u32, u64)>,
    ) -> RepoResult<Vec<E>> {
        let soft = self.soft_delete_enabled();
        let predicate = predicate.and(self.visibility(soft));

        let mut sql = self.select_sql(soft);
        sql.push_str(&predicate.where_clause());
        sql.push_str(&sort.order_clause::<E>()?);

        let mut bind_values: Vec<Value> = predicate.values().to_vec();
        if let Some((limit, offset)) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            bind_values.push(Value::Integer(to_sql_integer(offset)?));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }
        Ok(entities)
    }

    fn count_matching(&self, predicate: Predicate) -> RepoResult<u64> {
        let soft = self.soft_delete_enabled();
        let predicate = predicate.and(self.visibility(soft));
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            E::TABLE,
            predicate.where_clause()
        );
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(predicate.values()), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }

    fn insert(&self, mut entity: E, now: i64) -> RepoResult<E> {
        entity.audit_mut().stamp_created(now);

        let id = entity.id();
        let mut columns: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(id) = id.as_ref() {
            columns.extend_from_slice(E::KEY_COLUMNS);
            bind_values.extend(id.key_values());
        }
        columns.extend_from_slice(E::DATA_COLUMNS);
        bind_values.extend(entity.data_values());
        columns.extend_from_slice(AUDIT_COLUMNS);
        bind_values.extend(audit_values(entity.audit()));

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            E::TABLE,
            columns.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(bind_values))?;

        if id.is_none() {
            entity.assign_generated_id(self.conn.last_insert_rowid());
        }

        debug!(
            "event=entity_insert module=repo status=ok entity={} id={}",
            E::NAME,
            display_id(&entity)
        );
        Ok(entity)
    }

    /// Writes data columns and `updated_at`, then returns the stored row so
    /// the caller sees the persisted `created_*` stamp rather than its own.
    fn update(&self, entity: E, now: i64) -> RepoResult<E> {
        let id = entity.id().ok_or(RepoError::MissingIdentity(E::NAME))?;

        let soft = self.soft_delete_enabled();
        let predicate = Predicate::by_id::<E>(&id).and(self.visibility(soft));

        let assignments = E::DATA_COLUMNS
            .iter()
            .map(|column| format!("{column} = ?"))
            .chain(std::iter::once("updated_at = ?".to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments}{};",
            E::TABLE,
            predicate.where_clause()
        );

        let mut bind_values = entity.data_values();
        bind_values.push(Value::Integer(now));
        bind_values.extend(predicate.values().iter().cloned());

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            debug!(
                "event=entity_update module=repo status=not_found entity={} id={}",
                E::NAME,
                id
            );
            return Err(RepoError::not_found::<E>(&id));
        }

        let stored = self
            .query(Predicate::by_id::<E>(&id), &Sort::unsorted(), None)?
            .pop()
            .ok_or_else(|| RepoError::not_found::<E>(&id))?;
        debug!(
            "event=entity_update module=repo status=ok entity={} id={}",
            E::NAME,
            id
        );
        Ok(stored)
    }
}

impl<E: Entity> Repository<E> for SqliteRepository<'_, E> {
    fn find_all(&self) -> RepoResult<Vec<E>> {
        self.query(Predicate::all(), &Sort::unsorted(), None)
    }

    fn find_all_sorted(&self, sort: &Sort) -> RepoResult<Vec<E>> {
        self.query(Predicate::all(), sort, None)
    }

    fn find_all_paged(&self, request: &PageRequest) -> RepoResult<Page<E>> {
        if request.size == 0 {
            return Err(RepoError::InvalidPageRequest(
                "page size must be at least 1".to_string(),
            ));
        }

        let total_elements = self.count_matching(Predicate::all())?;
        let content = self.query(
            Predicate::all(),
            &request.sort,
            Some((request.size, request.offset())),
        )?;

        Ok(Page {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        })
    }

    fn find_all_matching(&self, predicate: Predicate) -> RepoResult<Vec<E>> {
        self.query(predicate, &Sort::unsorted(), None)
    }

    fn find_one(&self, id: &E::Id) -> RepoResult<Option<E>> {
        let mut found = self.query(Predicate::by_id::<E>(id), &Sort::unsorted(), None)?;
        Ok(found.pop())
    }

    fn count(&self) -> RepoResult<u64> {
        self.count_matching(Predicate::all())
    }

    fn save(&self, entity: E) -> RepoResult<E> {
        entity
            .validate()
            .map_err(|message| RepoError::Validation {
                entity: E::NAME,
                message,
            })?;

        let now = now_epoch_ms();
        if entity.is_new() {
            self.insert(entity, now)
        } else {
            self.update(entity, now)
        }
    }

    fn delete(&self, id: &E::Id) -> RepoResult<()> {
        let soft = self.soft_delete_enabled();
        let by_id = Predicate::by_id::<E>(id);

        let (mode, changed) = match (soft, E::DELETION_COLUMN) {
            (true, Some(column)) => {
                let predicate = by_id.and(self.visibility(soft));
                let sql = format!(
                    "UPDATE {} SET {column} = ?{};",
                    E::TABLE,
                    predicate.where_clause()
                );
                let bind_values = std::iter::once(Value::Integer(now_epoch_ms()))
                    .chain(predicate.values().iter().cloned());
                ("soft", self.conn.execute(&sql, params_from_iter(bind_values))?)
            }
            _ => {
                let sql = format!("DELETE FROM {}{};", E::TABLE, by_id.where_clause());
                ("hard", self.conn.execute(&sql, params_from_iter(by_id.values()))?)
            }
        };

        if changed == 0 {
            debug!(
                "event=entity_delete module=repo status=not_found entity={} id={} mode={}",
                E::NAME,
                id,
                mode
            );
            return Err(RepoError::not_found::<E>(id));
        }

        debug!(
            "event=entity_delete module=repo status=ok entity={} id={} mode={}",
            E::NAME,
            id,
            mode
        );
        Ok(())
    }

    fn delete_entity(&self, entity: &E) -> RepoResult<()> {
        let id = entity.id().ok_or(RepoError::MissingIdentity(E::NAME))?;
        self.delete(&id)
    }

    fn hard_delete(&self, entity: &E) -> RepoResult<()> {
        let id = entity.id().ok_or(RepoError::MissingIdentity(E::NAME))?;
        let by_id = Predicate::by_id::<E>(&id);
        let sql = format!("DELETE FROM {}{};", E::TABLE, by_id.where_clause());
        let removed = self.conn.execute(&sql, params_from_iter(by_id.values()))?;

        debug!(
            "event=entity_hard_delete module=repo status=ok entity={} id={} rows_removed={}",
            E::NAME,
            id,
            removed
        );
        Ok(())
    }
}

fn display_id<E: Entity>(entity: &E) -> String {
    entity
        .id()
        .map_or_else(|| "none".to_string(), |id| id.to_string())
}

fn to_sql_integer(value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidPageRequest(format!("offset {value} is out of range")))
}

fn ensure_entity_connection_ready<E: Entity>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, E::TABLE)? {
        return Err(RepoError::MissingRequiredTable(E::TABLE));
    }

    for &column in E::KEY_COLUMNS
        .iter()
        .chain(E::DATA_COLUMNS)
        .chain(AUDIT_COLUMNS)
    {
        if !table_has_column(conn, E::TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: E::TABLE,
                column,
            });
        }
    }

    Ok(())
}
