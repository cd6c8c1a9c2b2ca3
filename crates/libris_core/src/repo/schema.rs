//! SQLite schema introspection helpers shared by repository guards.

use rusqlite::Connection;

pub(crate) fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Looks up one column in `PRAGMA table_info`.
///
/// Returns `Some(nullable)` when the column exists.
pub(crate) fn column_nullability(
    conn: &Connection,
    table: &str,
    column: &str,
) -> rusqlite::Result<Option<bool>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            let not_null: i64 = row.get(3)?;
            return Ok(Some(not_null == 0));
        }
    }
    Ok(None)
}

pub(crate) fn table_has_column(
    conn: &Connection,
    table: &str,
    column: &str,
) -> rusqlite::Result<bool> {
    Ok(column_nullability(conn, table, column)?.is_some())
}
