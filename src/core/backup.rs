//! Backup codec - full-snapshot export and wholesale restore.
//!
//! An export bundles the product, sale, and notification collections with metadata
//! into one JSON document; the backup log records the export but is never part of the
//! payload, so the log cannot grow through its own backups. Restore is a two-step
//! contract: [`prepare_restore`] parses and validates without touching state and
//! reports whether the presentation layer must confirm with the user (any current
//! collection non-empty); [`apply_restore`] then overwrites all three collections.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    core::analytics::week_start,
    errors::{Error, Result},
    models::{BackupLogEntry, Notification, Product, Sale},
    store::Stockbook,
};

/// Descriptive metadata attached to an exported backup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    /// When the export ran
    pub exported_at: DateTime<Utc>,
    /// Monday of the calendar week the backup covers
    pub period_start: NaiveDate,
    /// Sunday of the calendar week the backup covers
    pub period_end: NaiveDate,
    /// Deterministic download file name embedding both period dates
    pub file_name: String,
}

/// The full backup payload. Field names and types are the external contract; they
/// must round-trip exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    /// Export metadata; optional on import
    #[serde(default)]
    pub metadata: Option<BackupMetadata>,
    /// The product collection
    pub products: Vec<Product>,
    /// The sale collection
    pub sales: Vec<Sale>,
    /// The notification collection
    pub notifications: Vec<Notification>,
}

/// A parsed, validated restore awaiting the presentation layer's go-ahead.
#[derive(Clone, Debug, PartialEq)]
pub struct RestorePlan {
    /// The document that will replace current state
    pub document: BackupDocument,
    /// Whether the user must confirm first (any current collection is non-empty)
    pub requires_confirmation: bool,
}

/// The Monday-through-Sunday calendar week containing `today`.
#[must_use]
pub fn backup_period(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = week_start(today);
    (start, start + Duration::days(6))
}

/// The deterministic download name for a backup covering the given period.
#[must_use]
pub fn backup_file_name(period_start: NaiveDate, period_end: NaiveDate) -> String {
    format!("stockbook-backup_{period_start}_{period_end}.json")
}

/// Exports the current product, sale, and notification collections and appends a
/// backup log entry for the export.
///
/// # Errors
/// Returns an error if the log entry cannot be stored.
pub async fn export_backup(app: &Stockbook) -> Result<BackupDocument> {
    let today = Local::now().date_naive();
    let (period_start, period_end) = backup_period(today);
    let file_name = backup_file_name(period_start, period_end);

    let metadata = BackupMetadata {
        exported_at: Utc::now(),
        period_start,
        period_end,
        file_name: file_name.clone(),
    };

    let document = BackupDocument {
        metadata: Some(metadata),
        products: app.products().snapshot().to_vec(),
        sales: app.sales().snapshot().to_vec(),
        notifications: app.notifications().snapshot().to_vec(),
    };

    app.backup_log()
        .add(BackupLogEntry {
            id: String::new(),
            logged_at: Utc::now(),
            period_start,
            period_end,
            file_name,
        })
        .await?;

    Ok(document)
}

/// Renders a backup document as pretty-printed JSON for download.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode_backup(document: &BackupDocument) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(Into::into)
}

/// Parses and validates a backup payload. The three collections must be present and
/// list-shaped; metadata is optional.
///
/// # Errors
/// Returns [`Error::BackupParse`] on any malformed payload; state is never touched.
pub fn parse_backup(raw: &str) -> Result<BackupDocument> {
    serde_json::from_str(raw).map_err(|e| Error::BackupParse {
        message: e.to_string(),
    })
}

/// Parses a backup payload and reports whether the restore needs user confirmation.
/// Nothing is mutated; hand the plan's document to [`apply_restore`] once the
/// presentation layer has confirmed (or immediately, when no confirmation is
/// required).
///
/// # Errors
/// Returns [`Error::BackupParse`] on a malformed payload.
pub fn prepare_restore(app: &Stockbook, raw: &str) -> Result<RestorePlan> {
    let document = parse_backup(raw)?;

    let requires_confirmation = !app.products().snapshot().is_empty()
        || !app.sales().snapshot().is_empty()
        || !app.notifications().snapshot().is_empty();

    Ok(RestorePlan {
        document,
        requires_confirmation,
    })
}

/// Wholesale-replaces the product, sale, and notification collections with the
/// document's contents, in memory and in durable storage. A full overwrite, not a
/// merge; the backup log is untouched.
///
/// # Errors
/// Returns an error if a collection cannot be replaced.
pub async fn apply_restore(app: &Stockbook, document: BackupDocument) -> Result<()> {
    app.products().replace_all(document.products).await?;
    app.sales().replace_all(document.sales).await?;
    app.notifications().replace_all(document.notifications).await?;
    Ok(())
}
