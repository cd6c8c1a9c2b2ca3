//! Audit and deletion value objects shared by every entity.

use log::warn;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Creator recorded when a caller does not name one.
pub const DEFAULT_CREATOR: &str = "SYSTEM";

/// Creation/update metadata stamped by the repository on every write.
///
/// Timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created_at: Option<i64>,
    pub created_by: Option<String>,
    pub updated_at: Option<i64>,
}

impl AuditStamp {
    /// Starts an audit stamp with an explicit creator.
    pub fn created_by(creator: impl Into<String>) -> Self {
        Self {
            created_by: Some(creator.into()),
            ..Self::default()
        }
    }

    /// Returns whether the repository has already written this record.
    pub fn is_persisted(&self) -> bool {
        self.created_at.is_some()
    }

    pub(crate) fn stamp_created(&mut self, now: i64) {
        self.created_at = Some(now);
        if self.created_by.is_none() {
            self.created_by = Some(DEFAULT_CREATOR.to_string());
        }
        self.updated_at = None;
    }
}

/// Logical deletion marker carried by soft-deletable records.
///
/// Never serialized: a deleted record is simply absent from every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionStamp {
    pub deleted_at: Option<i64>,
}

impl DeletionStamp {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    epoch_ms_at(SystemTime::now())
}

/// Clamps to `0` before the epoch and `i64::MAX` past it, logging either.
fn epoch_ms_at(time: SystemTime) -> i64 {
    let elapsed = match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed,
        Err(err) => {
            warn!(
                "event=clock_read module=core status=error reason=before_epoch skew_ms={}",
                err.duration().as_millis()
            );
            return 0;
        }
    };
    i64::try_from(elapsed.as_millis()).unwrap_or_else(|_| {
        warn!("event=clock_read module=core status=error reason=overflow");
        i64::MAX
    })
}
