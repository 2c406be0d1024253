//! Sale business logic - recording, re-quantifying, and deleting transactions.
//!
//! Every operation keeps product stock reconciled with the sale lifecycle and is
//! all-or-nothing per transaction: validation runs against current stock before any
//! mutation, so a multi-item sale either fully applies or leaves both collections
//! untouched. Items snapshot the product's name, type, and prices at recording time;
//! later edits may only change quantities and the sale timestamp.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    core::{notification, stock},
    errors::{Error, Result},
    models::{Product, ProductType, Sale, SaleItem},
    store::{Snapshot, Stockbook},
};

/// One requested line of a new sale.
#[derive(Debug, Clone)]
pub struct SaleItemRequest {
    /// Product being sold
    pub product_id: String,
    /// Quantity to sell; must be positive, whole-numbered for unit products
    pub quantity: f64,
}

/// A quantity change for one existing sale item.
#[derive(Debug, Clone)]
pub struct SaleItemEdit {
    /// Item to re-quantify
    pub item_id: String,
    /// New quantity sold
    pub quantity: f64,
}

/// An edit to a recorded sale. Only quantities and the business timestamp can
/// change; prices and product references are frozen snapshots.
#[derive(Debug, Clone, Default)]
pub struct SaleEdit {
    /// New business timestamp, if changing
    pub sold_at: Option<DateTime<Utc>>,
    /// Per-item quantity changes
    pub quantities: Vec<SaleItemEdit>,
}

fn validate_positive_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

/// Records a new multi-item sale, decrementing each referenced product's stock.
///
/// Requested quantities are summed per product across the whole transaction before
/// checking availability, so two items of the same product cannot jointly overdraw
/// it. On success the sale is stored with per-item price/name snapshots and low-stock
/// notifications are raised for any product that fell to the configured threshold.
///
/// # Errors
/// Returns an error - and changes nothing - if the item list is empty, a quantity is
/// non-positive or fractional for a unit product, a referenced product does not
/// exist, or aggregate demand exceeds any product's current stock.
pub async fn record_sale(
    app: &Stockbook,
    sold_at: DateTime<Utc>,
    requests: Vec<SaleItemRequest>,
) -> Result<Sale> {
    if requests.is_empty() {
        return Err(Error::Validation {
            message: "A sale needs at least one item".to_string(),
        });
    }
    for request in &requests {
        validate_positive_quantity(request.quantity)?;
    }

    let demand = stock::aggregate_demand(
        requests
            .iter()
            .map(|r| (r.product_id.as_str(), r.quantity)),
    );

    // Validate and decrement in one atomic pass over the product collection
    let demand_for_products = demand.clone();
    let requests_for_products = requests.clone();
    let sold_products: Vec<Product> = app
        .products()
        .commit(move |products| {
            stock::validate_recording(products, &demand_for_products)?;

            for request in &requests_for_products {
                let product = products
                    .iter()
                    .find(|p| p.id == request.product_id)
                    .ok_or_else(|| Error::ProductNotFound {
                        id: request.product_id.clone(),
                    })?;
                if product.product_type == ProductType::Unit && request.quantity.fract() != 0.0 {
                    return Err(Error::InvalidQuantity {
                        quantity: request.quantity,
                    });
                }
            }

            let snapshots: Vec<Product> = products
                .iter()
                .filter(|p| demand_for_products.iter().any(|(id, _)| id == &p.id))
                .cloned()
                .collect();

            let now = Utc::now();
            for (product_id, quantity) in &demand_for_products {
                if let Some(product) = products.iter_mut().find(|p| &p.id == product_id) {
                    product.quantity -= quantity;
                    product.last_modified = now;
                }
            }

            Ok(snapshots)
        })
        .await?;

    let sale_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let mut items = Vec::with_capacity(requests.len());
    for request in &requests {
        let product = sold_products
            .iter()
            .find(|p| p.id == request.product_id)
            .ok_or_else(|| Error::ProductNotFound {
                id: request.product_id.clone(),
            })?;
        items.push(SaleItem {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_type: product.product_type,
            quantity_sold: request.quantity,
            wholesale_price_per_unit: product.wholesale_price,
            retail_price_per_unit: product.retail_price,
            item_total_amount: 0.0,
        });
    }

    let mut sale = Sale {
        id: sale_id,
        sold_at,
        items,
        total_amount: 0.0,
        created_at: now,
        updated_at: now,
    };
    sale.recompute_totals();

    let sale = app.sales().add(sale).await?;

    let affected: Vec<String> = demand.into_iter().map(|(id, _)| id).collect();
    notification::check_low_stock(app, &affected).await?;

    Ok(sale)
}

/// Re-quantifies items of a recorded sale and/or moves its business timestamp,
/// reconciling product stock by the signed per-product delta.
///
/// For every changed item, `delta = old - new`: a positive delta returns stock, a
/// negative one consumes it, validated against current stock plus the sale's own
/// give-back capacity. Items whose product has since been deleted reconcile as a
/// no-op. Item totals and the sale total are recomputed from the frozen price
/// snapshots.
///
/// # Errors
/// Returns an error - and changes nothing - for an unknown sale or item id, a
/// non-positive or fractional-for-unit quantity, or a change exceeding available
/// stock.
pub async fn edit_sale(app: &Stockbook, sale_id: &str, edit: SaleEdit) -> Result<Sale> {
    let sale = get_sale(app, sale_id).ok_or_else(|| Error::SaleNotFound {
        id: sale_id.to_string(),
    })?;

    if edit.quantities.is_empty() && edit.sold_at.is_none() {
        return Ok(sale);
    }

    // Resolve every item edit against the sale before touching anything
    let mut changes: Vec<(SaleItem, f64)> = Vec::with_capacity(edit.quantities.len());
    for item_edit in &edit.quantities {
        let item = sale
            .items
            .iter()
            .find(|i| i.id == item_edit.item_id)
            .ok_or_else(|| Error::SaleItemNotFound {
                id: item_edit.item_id.clone(),
            })?;
        validate_positive_quantity(item_edit.quantity)?;
        if item.product_type == ProductType::Unit && item_edit.quantity.fract() != 0.0 {
            return Err(Error::InvalidQuantity {
                quantity: item_edit.quantity,
            });
        }
        changes.push((item.clone(), item_edit.quantity));
    }

    // Aggregate old and new quantities per product across the changed items
    let mut per_product: Vec<(String, f64, f64)> = Vec::new();
    for (item, new_quantity) in &changes {
        match per_product.iter_mut().find(|(id, _, _)| id == &item.product_id) {
            Some((_, old_sum, new_sum)) => {
                *old_sum += item.quantity_sold;
                *new_sum += new_quantity;
            }
            None => per_product.push((item.product_id.clone(), item.quantity_sold, *new_quantity)),
        }
    }

    let per_product_for_commit = per_product.clone();
    let affected: Vec<String> = app
        .products()
        .commit(move |products| {
            // Validate every delta first; a product deleted since the sale is a
            // missing weak reference and reconciles as a no-op
            for (product_id, old_sum, new_sum) in &per_product_for_commit {
                if let Some(product) = products.iter().find(|p| &p.id == product_id) {
                    stock::validate_quantity_change(product, *old_sum, *new_sum)?;
                }
            }

            let now = Utc::now();
            let mut touched = Vec::new();
            for (product_id, old_sum, new_sum) in &per_product_for_commit {
                if let Some(product) = products.iter_mut().find(|p| &p.id == product_id) {
                    product.quantity += old_sum - new_sum;
                    product.last_modified = now;
                    touched.push(product_id.clone());
                }
            }
            Ok(touched)
        })
        .await?;

    let new_quantities: Vec<(String, f64)> = changes
        .iter()
        .map(|(item, quantity)| (item.id.clone(), *quantity))
        .collect();
    let new_sold_at = edit.sold_at;

    let updated = app
        .sales()
        .edit(sale_id, move |sale| {
            for (item_id, quantity) in &new_quantities {
                if let Some(item) = sale.items.iter_mut().find(|i| &i.id == item_id) {
                    item.quantity_sold = *quantity;
                }
            }
            if let Some(sold_at) = new_sold_at {
                sale.sold_at = sold_at;
            }
            sale.recompute_totals();
            sale.updated_at = Utc::now();
            Ok(())
        })
        .await?;

    notification::check_low_stock(app, &affected).await?;

    Ok(updated)
}

/// Deletes a sale, returning every item's full quantity to its product's stock.
///
/// The reversal is unconditional - stock always goes back up, regardless of its
/// current level. Items referencing a since-deleted product are skipped silently.
///
/// # Errors
/// Returns [`Error::SaleNotFound`] when the id matches nothing.
pub async fn delete_sale(app: &Stockbook, sale_id: &str) -> Result<()> {
    let sale = get_sale(app, sale_id).ok_or_else(|| Error::SaleNotFound {
        id: sale_id.to_string(),
    })?;

    let restitution = stock::aggregate_demand(
        sale.items
            .iter()
            .map(|item| (item.product_id.as_str(), item.quantity_sold)),
    );

    app.products()
        .commit(move |products| {
            let now = Utc::now();
            for (product_id, quantity) in &restitution {
                if let Some(product) = products.iter_mut().find(|p| &p.id == product_id) {
                    product.quantity += quantity;
                    product.last_modified = now;
                }
            }
            Ok(())
        })
        .await?;

    app.sales().remove(sale_id).await;
    Ok(())
}

/// Retrieves a sale by id, returning `None` when it does not exist.
#[must_use]
pub fn get_sale(app: &Stockbook, sale_id: &str) -> Option<Sale> {
    app.sales()
        .snapshot()
        .iter()
        .find(|s| s.id == sale_id)
        .cloned()
}

/// The current sale collection snapshot, newest first.
#[must_use]
pub fn list_sales(app: &Stockbook) -> Snapshot<Sale> {
    app.sales().snapshot()
}
