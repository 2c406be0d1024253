//! Reactive entity stores and the root application handle.
//!
//! [`Stockbook`] is the explicit, constructed replacement for the source material of a
//! hidden module-level singleton: it owns the four entity stores, the database
//! connection, and the settings. The handle is cheap to clone and every clone shares
//! the same underlying state, so "one shared store per process" is a property of how
//! the application wires itself, not of a global.

pub mod entity_store;
pub mod kv;

pub use entity_store::{EntityStore, Snapshot, StoreEntity};

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    errors::Result,
    models::{BackupLogEntry, Notification, Product, Sale},
};

/// The root handle over all entity stores.
#[derive(Clone)]
pub struct Stockbook {
    db: DatabaseConnection,
    settings: Arc<AppConfig>,
    products: EntityStore<Product>,
    sales: EntityStore<Sale>,
    notifications: EntityStore<Notification>,
    backup_log: EntityStore<BackupLogEntry>,
    degraded: Arc<AtomicBool>,
}

impl Stockbook {
    /// Opens the application store per `settings`: connects to the configured
    /// database, creates tables, and hydrates every collection.
    ///
    /// # Errors
    /// Returns an error if the database cannot be reached or the schema cannot be
    /// created. Hydration itself never fails (unreadable snapshots fall back to
    /// empty collections).
    pub async fn open(settings: AppConfig) -> Result<Self> {
        let db = crate::config::database::create_connection(&settings.database_url).await?;
        crate::config::database::create_tables(&db).await?;
        Self::connect(db, settings).await
    }

    /// Builds the application store over an existing connection and hydrates every
    /// collection. Expects the tables to already exist.
    ///
    /// # Errors
    /// Returns an error if the post-hydration notification pruning cannot be applied.
    pub async fn connect(db: DatabaseConnection, settings: AppConfig) -> Result<Self> {
        let degraded = Arc::new(AtomicBool::new(false));
        let products = EntityStore::new(db.clone(), Arc::clone(&degraded));
        let sales = EntityStore::new(db.clone(), Arc::clone(&degraded));
        let notifications = EntityStore::new(db.clone(), Arc::clone(&degraded));
        let backup_log = EntityStore::new(db.clone(), Arc::clone(&degraded));

        let app = Self {
            db,
            settings: Arc::new(settings),
            products,
            sales,
            notifications,
            backup_log,
            degraded,
        };

        app.products.load().await;
        app.sales.load().await;
        app.notifications.load().await;
        app.backup_log.load().await;

        crate::core::notification::prune_notifications(&app).await?;

        Ok(app)
    }

    /// The product collection store.
    #[must_use]
    pub const fn products(&self) -> &EntityStore<Product> {
        &self.products
    }

    /// The sale collection store.
    #[must_use]
    pub const fn sales(&self) -> &EntityStore<Sale> {
        &self.sales
    }

    /// The notification collection store.
    #[must_use]
    pub const fn notifications(&self) -> &EntityStore<Notification> {
        &self.notifications
    }

    /// The backup log store.
    #[must_use]
    pub const fn backup_log(&self) -> &EntityStore<BackupLogEntry> {
        &self.backup_log
    }

    /// The active application settings.
    #[must_use]
    pub fn settings(&self) -> &AppConfig {
        &self.settings
    }

    /// The underlying database connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Whether any persistence write has failed since startup. When set, in-memory
    /// state is still correct but will not survive a restart; the presentation layer
    /// should surface this to the user.
    #[must_use]
    pub fn persistence_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Full application reset: empties every collection and deletes every durable
    /// key, including the backup log - the only operation that clears the log.
    pub async fn reset_all(&self) {
        self.products.clear().await;
        self.sales.clear().await;
        self.notifications.clear().await;
        self.backup_log.clear().await;
    }
}
