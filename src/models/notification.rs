//! Notification model - in-app alerts with read tracking and retention metadata.
//!
//! Low-stock alerts carry a structured category and the affected product id, which is
//! what the de-duplication rule keys on. The retention policy itself lives in
//! [`crate::core::notification`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::Error, store::StoreEntity};

/// Structured classification of a notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// A product's stock fell to or below the configured threshold
    LowStock,
    /// Anything else
    #[default]
    General,
}

/// An in-app alert shown to the shop owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Opaque unique identifier
    pub id: String,
    /// Display text
    pub message: String,
    /// When the notification was raised
    pub created_at: DateTime<Utc>,
    /// Whether the user has seen it
    pub read: bool,
    /// Structured category, used for de-duplication
    #[serde(default)]
    pub category: NotificationCategory,
    /// Product this notification concerns, if any
    pub product_id: Option<String>,
    /// Route the presentation layer should navigate to when activated
    pub navigate_to: Option<String>,
}

impl StoreEntity for Notification {
    const STORAGE_KEY: &'static str = "stockbook:notifications";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn not_found(id: &str) -> Error {
        Error::NotificationNotFound { id: id.to_string() }
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}
