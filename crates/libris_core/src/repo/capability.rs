//! Soft-delete capability registry.
//!
//! # Responsibility
//! - Decide once per entity type whether deletes become timestamp updates.
//! - Cache the decision for the process lifetime.
//!
//! # Invariants
//! - A type is soft only when it declares `DELETION_COLUMN` and its table
//!   carries that column as nullable.
//! - Inspection never fails the caller: any problem resolves to "hard" and
//!   is logged.

use crate::repo::entity::Entity;
use crate::repo::schema::column_nullability;
use log::{error, info, warn};
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

static SOFT_DELETE_CAPABILITIES: Lazy<RwLock<HashMap<TypeId, bool>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Returns whether `E` uses soft-delete semantics.
///
/// The first call per type inspects `conn`; later calls return the cached
/// answer without touching the database.
pub fn supports_soft_delete<E: Entity>(conn: &Connection) -> bool {
    if let Some(cached) = cached_capability::<E>() {
        return cached;
    }

    let detected = detect_capability::<E>(conn);
    let mut capabilities = SOFT_DELETE_CAPABILITIES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *capabilities.entry(TypeId::of::<E>()).or_insert(detected)
}

/// Returns the cached decision for `E`, if one was made already.
pub fn cached_capability<E: Entity>() -> Option<bool> {
    SOFT_DELETE_CAPABILITIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&TypeId::of::<E>())
        .copied()
}

fn detect_capability<E: Entity>(conn: &Connection) -> bool {
    let Some(column) = E::DELETION_COLUMN else {
        info!(
            "event=capability_detect module=repo status=ok entity={} soft_delete=false reason=undeclared",
            E::NAME
        );
        return false;
    };

    match column_nullability(conn, E::TABLE, column) {
        Ok(Some(true)) => {
            info!(
                "event=capability_detect module=repo status=ok entity={} soft_delete=true column={}",
                E::NAME,
                column
            );
            true
        }
        Ok(Some(false)) => {
            warn!(
                "event=capability_detect module=repo status=misconfigured entity={} soft_delete=false reason=column_not_nullable table={} column={}",
                E::NAME,
                E::TABLE,
                column
            );
            false
        }
        Ok(None) => {
            warn!(
                "event=capability_detect module=repo status=misconfigured entity={} soft_delete=false reason=column_missing table={} column={}",
                E::NAME,
                E::TABLE,
                column
            );
            false
        }
        Err(err) => {
            error!(
                "event=capability_detect module=repo status=error entity={} soft_delete=false error_code=inspection_failed error={}",
                E::NAME,
                err
            );
            false
        }
    }
}
