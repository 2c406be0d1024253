//! Product business logic - catalog CRUD with stock-aware validation.
//!
//! All operations validate before mutating: a rejected input leaves the collection
//! untouched and surfaces a typed error. Deleting a product never cascades into sale
//! history - sales carry their own snapshots of the product's name and prices.

use chrono::Utc;

use crate::{
    errors::{Error, Result},
    models::{Product, ProductType},
    store::{Snapshot, Stockbook},
};

/// Validated form data for creating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    /// Display name
    pub name: String,
    /// Unit of measure
    pub product_type: ProductType,
    /// Purchase cost per unit
    pub wholesale_price: f64,
    /// Selling price per unit
    pub retail_price: f64,
    /// Opening stock
    pub quantity: f64,
}

/// Partial update for an existing product; unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    /// New display name
    pub name: Option<String>,
    /// New unit of measure
    pub product_type: Option<ProductType>,
    /// New purchase cost per unit
    pub wholesale_price: Option<f64>,
    /// New selling price per unit
    pub retail_price: Option<f64>,
    /// New stock level (manual correction)
    pub quantity: Option<f64>,
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_prices(wholesale: f64, retail: f64) -> Result<()> {
    if !wholesale.is_finite() || wholesale < 0.0 {
        return Err(Error::InvalidPrice { amount: wholesale });
    }
    if !retail.is_finite() || retail < 0.0 {
        return Err(Error::InvalidPrice { amount: retail });
    }
    if retail < wholesale {
        return Err(Error::Validation {
            message: format!(
                "Retail price {retail} cannot be below wholesale price {wholesale}"
            ),
        });
    }
    Ok(())
}

/// Creates a new product after validating the form data.
///
/// # Errors
/// Returns an error if the name is empty, a price is negative or non-finite, the
/// retail price is below the wholesale price, or the quantity is invalid for the
/// product type.
pub async fn create_product(app: &Stockbook, input: ProductInput) -> Result<Product> {
    let name = validate_name(&input.name)?;
    validate_prices(input.wholesale_price, input.retail_price)?;
    if !input.product_type.allows_quantity(input.quantity) {
        return Err(Error::InvalidQuantity {
            quantity: input.quantity,
        });
    }

    let product = Product {
        id: String::new(),
        name,
        product_type: input.product_type,
        wholesale_price: input.wholesale_price,
        retail_price: input.retail_price,
        quantity: input.quantity,
        last_modified: Utc::now(),
    };

    app.products().add(product).await
}

/// Applies a partial update to a product, re-validating the merged result.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] for an unknown id, or a validation error when
/// the merged name, prices, or quantity are invalid; in either case nothing changes.
pub async fn update_product(app: &Stockbook, product_id: &str, patch: ProductPatch) -> Result<Product> {
    app.products()
        .edit(product_id, move |product| {
            let name = match &patch.name {
                Some(name) => validate_name(name)?,
                None => product.name.clone(),
            };
            let product_type = patch.product_type.unwrap_or(product.product_type);
            let wholesale = patch.wholesale_price.unwrap_or(product.wholesale_price);
            let retail = patch.retail_price.unwrap_or(product.retail_price);
            let quantity = patch.quantity.unwrap_or(product.quantity);

            validate_prices(wholesale, retail)?;
            if !product_type.allows_quantity(quantity) {
                return Err(Error::InvalidQuantity { quantity });
            }

            product.name = name;
            product.product_type = product_type;
            product.wholesale_price = wholesale;
            product.retail_price = retail;
            product.quantity = quantity;
            product.last_modified = Utc::now();
            Ok(())
        })
        .await
}

/// Deletes a product. Historical sales referencing it are left untouched; their
/// snapshots keep displaying correctly and future reconciliation against the missing
/// product becomes a no-op.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] when the id matches nothing.
pub async fn delete_product(app: &Stockbook, product_id: &str) -> Result<()> {
    if app.products().remove(product_id).await {
        Ok(())
    } else {
        Err(Error::ProductNotFound {
            id: product_id.to_string(),
        })
    }
}

/// Retrieves a product by id, returning `None` when it does not exist.
#[must_use]
pub fn get_product(app: &Stockbook, product_id: &str) -> Option<Product> {
    app.products()
        .snapshot()
        .iter()
        .find(|p| p.id == product_id)
        .cloned()
}

/// The current product collection snapshot.
#[must_use]
pub fn list_products(app: &Stockbook) -> Snapshot<Product> {
    app.products().snapshot()
}
