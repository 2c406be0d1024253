//! Sale model - point-of-sale transactions with per-item product snapshots.
//!
//! Each [`SaleItem`] duplicates the referenced product's name, type, and prices at the
//! moment of recording. This denormalization is intentional: history must display
//! correctly after the product is edited or deleted. The `product_id` is a weak
//! reference and may point at a product that no longer exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::Error, models::ProductType, store::StoreEntity};

/// One line of a sale, frozen at recording time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    /// Opaque unique identifier
    pub id: String,
    /// Identifier of the owning sale
    pub sale_id: String,
    /// Weak reference to the product sold; may be dangling after product deletion
    pub product_id: String,
    /// Product name as it read when the sale was recorded
    pub product_name: String,
    /// Product unit of measure when the sale was recorded
    pub product_type: ProductType,
    /// Quantity sold; always positive, whole-numbered for unit products
    pub quantity_sold: f64,
    /// Purchase cost per unit when the sale was recorded
    pub wholesale_price_per_unit: f64,
    /// Selling price per unit when the sale was recorded
    pub retail_price_per_unit: f64,
    /// `retail_price_per_unit * quantity_sold`; recomputed, never edited directly
    pub item_total_amount: f64,
}

/// A recorded point-of-sale transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Opaque unique identifier
    pub id: String,
    /// Business timestamp of the sale, distinct from `created_at`
    pub sold_at: DateTime<Utc>,
    /// Ordered lines of the transaction
    pub items: Vec<SaleItem>,
    /// Sum of all item totals; recomputed on every change
    pub total_amount: f64,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last edited
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Recomputes every item total and the transaction total from quantities and
    /// price snapshots. Call after any quantity change; totals are derived values
    /// and must never drift from their inputs.
    pub fn recompute_totals(&mut self) {
        let mut total = 0.0;
        for item in &mut self.items {
            item.item_total_amount = item.retail_price_per_unit * item.quantity_sold;
            total += item.item_total_amount;
        }
        self.total_amount = total;
    }
}

impl StoreEntity for Sale {
    const STORAGE_KEY: &'static str = "stockbook:sales";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn not_found(id: &str) -> Error {
        Error::SaleNotFound { id: id.to_string() }
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| b.sold_at.cmp(&a.sold_at));
    }
}
