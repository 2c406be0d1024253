//! Notification business logic - alerts, read tracking, retention, de-duplication.
//!
//! Retention runs on every load/add cycle: the collection keeps at most
//! [`MAX_RETAINED`] newest entries and drops read notifications older than
//! [`READ_RETENTION_DAYS`]. Low-stock alerts de-duplicate on the structured
//! category plus product id - while an unread low-stock alert for a product exists,
//! new ones for the same product are suppressed.

use chrono::{DateTime, Utc};

use crate::{
    errors::Result,
    models::{Notification, NotificationCategory},
    store::Stockbook,
};

/// Maximum number of notifications retained.
pub const MAX_RETAINED: usize = 50;

/// Days a read notification survives before pruning.
pub const READ_RETENTION_DAYS: i64 = 7;

/// Route the presentation layer navigates to from a low-stock alert.
const INVENTORY_ROUTE: &str = "/inventory";

/// Form data for raising a notification.
#[derive(Debug, Clone)]
pub struct NotificationInput {
    /// Display text
    pub message: String,
    /// Structured category
    pub category: NotificationCategory,
    /// Product the notification concerns, if any
    pub product_id: Option<String>,
    /// Route to navigate to when activated
    pub navigate_to: Option<String>,
}

/// Applies the retention policy to a newest-first collection. Returns whether
/// anything was dropped.
fn prune_in_place(items: &mut Vec<Notification>, now: DateTime<Utc>) -> bool {
    let before = items.len();
    let cutoff = now - chrono::Duration::days(READ_RETENTION_DAYS);
    items.retain(|n| !(n.read && n.created_at < cutoff));
    items.truncate(MAX_RETAINED);
    items.len() < before
}

/// Raises a notification, subject to de-duplication and retention.
///
/// Returns `Ok(None)` when a new low-stock alert was suppressed because an unread
/// low-stock alert for the same product already exists.
///
/// # Errors
/// Returns an error if the store mutation fails.
pub async fn add_notification(
    app: &Stockbook,
    input: NotificationInput,
) -> Result<Option<Notification>> {
    if input.category == NotificationCategory::LowStock {
        if let Some(product_id) = &input.product_id {
            let duplicate = app.notifications().snapshot().iter().any(|n| {
                !n.read
                    && n.category == NotificationCategory::LowStock
                    && n.product_id.as_deref() == Some(product_id.as_str())
            });
            if duplicate {
                return Ok(None);
            }
        }
    }

    let notification = Notification {
        id: String::new(),
        message: input.message,
        created_at: Utc::now(),
        read: false,
        category: input.category,
        product_id: input.product_id,
        navigate_to: input.navigate_to,
    };

    let stored = app.notifications().add(notification).await?;
    prune_notifications(app).await?;

    Ok(Some(stored))
}

/// Applies the retention policy to the stored collection. Invoked on hydration and
/// after every add; a no-op when nothing qualifies for pruning.
///
/// # Errors
/// Returns an error if the store mutation fails.
pub async fn prune_notifications(app: &Stockbook) -> Result<()> {
    let now = Utc::now();

    let snapshot = app.notifications().snapshot();
    let mut candidate = (*snapshot).clone();
    if !prune_in_place(&mut candidate, now) {
        return Ok(());
    }

    app.notifications()
        .commit(move |items| {
            prune_in_place(items, now);
            Ok(())
        })
        .await
}

/// Marks a notification as read.
///
/// # Errors
/// Returns [`crate::errors::Error::NotificationNotFound`] for an unknown id.
pub async fn mark_read(app: &Stockbook, notification_id: &str) -> Result<Notification> {
    app.notifications()
        .edit(notification_id, |notification| {
            notification.read = true;
            Ok(())
        })
        .await
}

/// Marks every notification as read, returning how many changed.
///
/// # Errors
/// Returns an error if the store mutation fails.
pub async fn mark_all_read(app: &Stockbook) -> Result<usize> {
    app.notifications()
        .commit(|items| {
            let mut changed = 0;
            for notification in items.iter_mut() {
                if !notification.read {
                    notification.read = true;
                    changed += 1;
                }
            }
            Ok(changed)
        })
        .await
}

/// How many notifications are currently unread.
#[must_use]
pub fn unread_count(app: &Stockbook) -> usize {
    app.notifications()
        .snapshot()
        .iter()
        .filter(|n| !n.read)
        .count()
}

/// Raises a low-stock alert for each listed product whose quantity sits at or below
/// the configured threshold. De-duplication applies per product.
///
/// # Errors
/// Returns an error if a store mutation fails.
pub async fn check_low_stock(app: &Stockbook, product_ids: &[String]) -> Result<()> {
    let threshold = app.settings().low_stock_threshold;
    let products = app.products().snapshot();

    for product_id in product_ids {
        let Some(product) = products.iter().find(|p| &p.id == product_id) else {
            continue;
        };
        if product.quantity > threshold {
            continue;
        }

        add_notification(
            app,
            NotificationInput {
                message: format!(
                    "{} is running low: {} left in stock",
                    product.name, product.quantity
                ),
                category: NotificationCategory::LowStock,
                product_id: Some(product.id.clone()),
                navigate_to: Some(INVENTORY_ROUTE.to_string()),
            },
        )
        .await?;
    }

    Ok(())
}
