//! Entity module - Contains the SeaORM entity definitions for the database.
//!
//! Durable storage is a single key-value table: each entity collection is mirrored as
//! one JSON-serialized array under a fixed namespaced key. The domain models themselves
//! live in [`crate::models`] and are plain serde types.

pub mod storage_record;

pub use storage_record::{
    Column as StorageRecordColumn, Entity as StorageRecord, Model as StorageRecordModel,
};
