//! Database configuration module.
//!
//! Handles `SQLite` connection setup and table creation using `SeaORM`. The schema is
//! generated from the entity definitions via `Schema::create_table_from_entity`, so the
//! database shape always matches the Rust struct definitions without manual SQL.

use crate::entities::StorageRecord;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default on-disk database location when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/stockbook.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// the default local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the durable snapshot table if it does not already exist.
///
/// # Errors
/// Returns an error if the schema statement fails to execute.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut storage_table = schema.create_table_from_entity(StorageRecord);
    storage_table.if_not_exists();

    db.execute(builder.build(&storage_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StorageRecordModel;
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Verify the connection works by querying the new table
        let _: Vec<StorageRecordModel> = StorageRecord::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<StorageRecordModel> = StorageRecord::find().limit(1).all(&db).await?;
        Ok(())
    }
}
