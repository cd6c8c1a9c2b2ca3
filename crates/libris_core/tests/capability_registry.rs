use libris_core::repo::entity::{audit_from_row, deletion_from_row};
use libris_core::{
    cached_capability, open_db_in_memory, supports_soft_delete, AuditStamp, DeletionStamp,
    Entity, RepoResult, Repository, SqliteRepository,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

/// Declares a throwaway soft-declared record type bound to `$table`.
///
/// The capability cache is process-wide, so every test gets its own type.
macro_rules! memo_entity {
    ($name:ident, $table:expr) => {
        #[derive(Debug, Clone)]
        #[allow(dead_code)]
        struct $name {
            id: Option<i64>,
            body: String,
            audit: AuditStamp,
            deletion: DeletionStamp,
        }

        #[allow(dead_code)]
        impl $name {
            fn new(body: &str) -> Self {
                Self {
                    id: None,
                    body: body.to_string(),
                    audit: AuditStamp::default(),
                    deletion: DeletionStamp::default(),
                }
            }
        }

        impl Entity for $name {
            type Id = i64;

            const NAME: &'static str = "memo";
            const TABLE: &'static str = $table;
            const KEY_COLUMNS: &'static [&'static str] = &["id"];
            const DATA_COLUMNS: &'static [&'static str] = &["body"];
            const DELETION_COLUMN: Option<&'static str> = Some("deleted_at");

            fn id(&self) -> Option<i64> {
                self.id
            }

            fn assign_generated_id(&mut self, rowid: i64) {
                self.id = Some(rowid);
            }

            fn data_values(&self) -> Vec<Value> {
                vec![Value::Text(self.body.clone())]
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
                    body: row.get("body")?,
                    audit: audit_from_row(row)?,
                    deletion: deletion_from_row(row, "deleted_at")?,
                })
            }
        }
    };
}

const AUDIT_DDL: &str = "created_at INTEGER NOT NULL,
    created_by TEXT NOT NULL,
    updated_at INTEGER NULL";

fn create_memo_table(conn: &Connection, table: &str, deletion_column: Option<&str>) {
    let deletion = deletion_column.map_or_else(String::new, |ddl| format!(",\n    {ddl}"));
    conn.execute_batch(&format!(
        "CREATE TABLE {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            body TEXT NOT NULL,
            {AUDIT_DDL}{deletion}
        );"
    ))
    .unwrap();
}

fn row_exists(conn: &Connection, table: &str, id: i64) -> bool {
    conn.query_row(
        &format!("SELECT 1 FROM {table} WHERE id = ?1;"),
        [id],
        |row| row.get::<_, i64>(0),
    )
    .optional()
    .unwrap()
    .is_some()
}

#[test]
fn nullable_column_enables_soft_delete() {
    memo_entity!(SoftMemo, "memo_soft");
    let conn = open_db_in_memory().unwrap();
    create_memo_table(&conn, "memo_soft", Some("deleted_at INTEGER NULL"));

    assert_eq!(cached_capability::<SoftMemo>(), None);
    assert!(supports_soft_delete::<SoftMemo>(&conn));
    assert_eq!(cached_capability::<SoftMemo>(), Some(true));

    let repo = SqliteRepository::<SoftMemo>::try_new(&conn).unwrap();
    let id = repo.save(SoftMemo::new("keep me")).unwrap().id.unwrap();
    repo.delete(&id).unwrap();
    assert!(repo.find_one(&id).unwrap().is_none());
    assert!(row_exists(&conn, "memo_soft", id));
}

#[test]
fn decision_is_cached_across_connections() {
    memo_entity!(CachedMemo, "memo_cached");
    let first = open_db_in_memory().unwrap();
    create_memo_table(&first, "memo_cached", Some("deleted_at INTEGER NULL"));
    assert!(supports_soft_delete::<CachedMemo>(&first));

    let second = open_db_in_memory().unwrap();
    create_memo_table(&second, "memo_cached", None);
    assert!(supports_soft_delete::<CachedMemo>(&second));
}

#[test]
fn missing_column_falls_back_to_hard_delete() {
    memo_entity!(BareMemo, "memo_bare");
    let conn = open_db_in_memory().unwrap();
    create_memo_table(&conn, "memo_bare", None);

    let repo = SqliteRepository::<BareMemo>::try_new(&conn).unwrap();
    assert!(!repo.soft_delete_enabled());
    assert_eq!(cached_capability::<BareMemo>(), Some(false));

    let saved = repo.save(BareMemo::new("gone")).unwrap();
    let id = saved.id.unwrap();
    let loaded = repo.find_one(&id).unwrap().unwrap();
    assert!(!loaded.deletion.is_deleted());

    repo.delete(&id).unwrap();
    assert!(!row_exists(&conn, "memo_bare", id));
}

#[test]
fn not_null_column_is_not_a_soft_delete_marker() {
    memo_entity!(StrictMemo, "memo_strict");
    let conn = open_db_in_memory().unwrap();
    create_memo_table(
        &conn,
        "memo_strict",
        Some("deleted_at INTEGER NOT NULL DEFAULT 0"),
    );

    assert!(!supports_soft_delete::<StrictMemo>(&conn));
}

#[test]
fn inspection_failure_reports_no_capability() {
    memo_entity!(BrokenMemo, "broken memo");
    let conn = open_db_in_memory().unwrap();

    assert!(!supports_soft_delete::<BrokenMemo>(&conn));
    assert_eq!(cached_capability::<BrokenMemo>(), Some(false));
}

#[test]
fn catalog_and_transaction_types_resolve_as_declared() {
    let conn = open_db_in_memory().unwrap();

    assert!(supports_soft_delete::<libris_core::Author>(&conn));
    assert!(supports_soft_delete::<libris_core::Book>(&conn));
    assert!(supports_soft_delete::<libris_core::BookDetail>(&conn));
    assert!(!supports_soft_delete::<libris_core::Transaction>(&conn));
    assert!(!supports_soft_delete::<libris_core::TransactionDetail>(&conn));
}
