//! Domain models - the entity collections persisted as JSON snapshots.
//!
//! Every model serializes in camelCase; the serialized shape is the external contract
//! shared by durable storage and the backup file format, so field names and types must
//! round-trip exactly.

pub mod backup_log;
pub mod notification;
pub mod product;
pub mod sale;

pub use backup_log::BackupLogEntry;
pub use notification::{Notification, NotificationCategory};
pub use product::{Product, ProductType};
pub use sale::{Sale, SaleItem};
