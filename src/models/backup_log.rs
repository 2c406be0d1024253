//! Backup log model - an append-only record of successful exports.
//!
//! Log entries are excluded from exported payloads so the log cannot recursively grow
//! through its own backups. The collection is cleared only by a full application reset.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::Error, store::StoreEntity};

/// One successful backup export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupLogEntry {
    /// Opaque unique identifier
    pub id: String,
    /// When the export ran
    pub logged_at: DateTime<Utc>,
    /// First day of the calendar week the backup covers
    pub period_start: NaiveDate,
    /// Last day of the calendar week the backup covers
    pub period_end: NaiveDate,
    /// File name the export was offered under
    pub file_name: String,
}

impl StoreEntity for BackupLogEntry {
    const STORAGE_KEY: &'static str = "stockbook:backup-log";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn not_found(id: &str) -> Error {
        Error::Validation {
            message: format!("backup log entry not found: {id}"),
        }
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
    }
}
