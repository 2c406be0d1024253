//! Product model - catalog entries with wholesale/retail pricing and stock on hand.
//!
//! A product's `quantity` is the single source of truth for available stock and is
//! only ever adjusted through store operations, which reject any change that would
//! drive it negative. Sales capture price/name snapshots at recording time, so a
//! product can be freely edited or deleted without rewriting history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::Error, store::StoreEntity};

/// Unit of measure for a product's stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Sold by weight; fractional quantities allowed
    Powder,
    /// Sold by volume; fractional quantities allowed
    Liquid,
    /// Sold by piece; quantities must be whole numbers
    Unit,
}

impl ProductType {
    /// Whether `quantity` is a representable stock level for this unit of measure.
    ///
    /// Unit-counted products only accept whole numbers; powders and liquids accept
    /// any finite non-negative value.
    #[must_use]
    pub fn allows_quantity(self, quantity: f64) -> bool {
        quantity.is_finite() && quantity >= 0.0 && (self != Self::Unit || quantity.fract() == 0.0)
    }
}

/// A catalog product with current stock on hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Unit of measure
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// Purchase cost per unit
    pub wholesale_price: f64,
    /// Selling price per unit; never below `wholesale_price`
    pub retail_price: f64,
    /// Stock on hand; never negative
    pub quantity: f64,
    /// When the product was last created, edited, or reconciled against
    pub last_modified: DateTime<Utc>,
}

impl StoreEntity for Product {
    const STORAGE_KEY: &'static str = "stockbook:products";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn not_found(id: &str) -> Error {
        Error::ProductNotFound { id: id.to_string() }
    }

    // Products carry no inherent ordering; the default no-op sort applies.
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_unit_products_require_whole_quantities() {
        assert!(ProductType::Unit.allows_quantity(3.0));
        assert!(ProductType::Unit.allows_quantity(0.0));
        assert!(!ProductType::Unit.allows_quantity(2.5));
        assert!(!ProductType::Unit.allows_quantity(-1.0));
    }

    #[test]
    fn test_measured_products_accept_fractions() {
        assert!(ProductType::Powder.allows_quantity(0.25));
        assert!(ProductType::Liquid.allows_quantity(1.5));
        assert!(!ProductType::Powder.allows_quantity(f64::NAN));
        assert!(!ProductType::Liquid.allows_quantity(f64::INFINITY));
    }

    #[test]
    fn test_product_type_serializes_lowercase() {
        let json = serde_json::to_string(&ProductType::Powder).unwrap();
        assert_eq!(json, "\"powder\"");
        let back: ProductType = serde_json::from_str("\"unit\"").unwrap();
        assert_eq!(back, ProductType::Unit);
    }
}
