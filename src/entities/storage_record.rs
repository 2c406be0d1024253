//! Storage record entity - the durable key-value snapshot table.
//!
//! One row per entity collection: the `key` is the collection's fixed namespaced name
//! and `value` holds the whole collection serialized as a JSON array. Removing a row is
//! how a store's `clear()` differs from persisting an empty array.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key-value snapshot row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_records")]
pub struct Model {
    /// Fixed namespaced collection key (e.g. `"stockbook:products"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// The collection, serialized as a JSON array
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this snapshot was last written
    pub updated_at: DateTime,
}

/// `StorageRecord` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
