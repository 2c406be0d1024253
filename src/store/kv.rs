//! Key-value persistence over the durable snapshot table.
//!
//! Thin wrappers around the [`crate::entities::storage_record`] entity. Each entity
//! store reads and writes exactly one key; the value is the whole collection as a JSON
//! array. Callers decide how to treat failures - the store layer logs and degrades
//! rather than propagating.

use crate::{
    entities::{StorageRecord, storage_record},
    errors::Result,
};
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// Reads the raw JSON payload stored under `key`, if any.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn read_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    Ok(StorageRecord::find_by_id(key.to_string())
        .one(db)
        .await?
        .map(|record| record.value))
}

/// Writes `value` under `key`, inserting or updating as needed.
///
/// # Errors
/// Returns an error if the insert or update fails.
pub async fn write_value<C>(db: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();

    let existing = StorageRecord::find_by_id(key.to_string()).one(db).await?;

    if let Some(record) = existing {
        let mut active: storage_record::ActiveModel = record.into();
        active.value = Set(value);
        active.updated_at = Set(now);
        active.update(db).await?;
    } else {
        let record = storage_record::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
        };
        record.insert(db).await?;
    }

    Ok(())
}

/// Deletes the row stored under `key`. Distinct from writing an empty array: after
/// removal the key no longer exists at all.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn remove_value<C>(db: &C, key: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = StorageRecord::delete_by_id(key.to_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use sea_orm::Database;

    async fn setup_db() -> Result<sea_orm::DatabaseConnection> {
        let db = Database::connect("sqlite::memory:").await?;
        crate::config::database::create_tables(&db).await?;
        Ok(db)
    }

    #[tokio::test]
    async fn test_write_and_read_round_trip() -> Result<()> {
        let db = setup_db().await?;

        write_value(&db, "stockbook:test", "[1,2,3]".to_string()).await?;
        let value = read_value(&db, "stockbook:test").await?;

        assert_eq!(value, Some("[1,2,3]".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_write_replaces_existing_value() -> Result<()> {
        let db = setup_db().await?;

        write_value(&db, "stockbook:test", "[]".to_string()).await?;
        write_value(&db, "stockbook:test", "[42]".to_string()).await?;

        let value = read_value(&db, "stockbook:test").await?;
        assert_eq!(value, Some("[42]".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_key_is_none() -> Result<()> {
        let db = setup_db().await?;

        let value = read_value(&db, "stockbook:absent").await?;
        assert!(value.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_deletes_the_key() -> Result<()> {
        let db = setup_db().await?;

        write_value(&db, "stockbook:test", "[]".to_string()).await?;
        assert!(remove_value(&db, "stockbook:test").await?);
        assert!(!remove_value(&db, "stockbook:test").await?);

        let value = read_value(&db, "stockbook:test").await?;
        assert!(value.is_none());
        Ok(())
    }
}
