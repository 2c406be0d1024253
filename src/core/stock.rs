//! Stock reconciliation rules - pure validation over products and requested
//! quantities.
//!
//! Reconciliation is delta-based: product stock is adjusted incrementally as sales are
//! recorded, re-quantified, or deleted, never recomputed from sale history. The
//! functions here validate a proposed adjustment against current stock before any
//! mutation happens; the mutations themselves live in [`crate::core::sale`].

use crate::{
    errors::{Error, Result},
    models::Product,
};

/// Sums requested quantities per product, preserving first-seen order.
///
/// A transaction may reference the same product from several items; availability is
/// checked against the aggregate, not per item.
#[must_use]
pub fn aggregate_demand<'a, I>(requests: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut totals: Vec<(String, f64)> = Vec::new();
    for (product_id, quantity) in requests {
        match totals.iter_mut().find(|(id, _)| id == product_id) {
            Some((_, total)) => *total += quantity,
            None => totals.push((product_id.to_string(), quantity)),
        }
    }
    totals
}

/// Validates that every product in `demand` exists and has enough stock to cover its
/// aggregate requested quantity.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] for an unknown product id and
/// [`Error::InsufficientStock`] when the aggregate demand exceeds current stock.
pub fn validate_recording(products: &[Product], demand: &[(String, f64)]) -> Result<()> {
    for (product_id, requested) in demand {
        let product = products
            .iter()
            .find(|p| &p.id == product_id)
            .ok_or_else(|| Error::ProductNotFound {
                id: product_id.clone(),
            })?;

        if *requested > product.quantity {
            return Err(Error::InsufficientStock {
                product: product.name.clone(),
                requested: *requested,
                available: product.quantity,
            });
        }
    }
    Ok(())
}

/// Validates changing a sale's already-recorded quantity against current stock.
///
/// The sale's original quantity is give-back capacity: re-quantifying from `original`
/// to `new` is feasible exactly when `new <= current_stock + original`, because the
/// original units return to stock before the new ones are taken.
///
/// # Errors
/// Returns [`Error::InsufficientStock`] when the new quantity exceeds the give-back
/// capacity.
pub fn validate_quantity_change(
    product: &Product,
    original_quantity: f64,
    new_quantity: f64,
) -> Result<()> {
    let available = product.quantity + original_quantity;
    if new_quantity > available {
        return Err(Error::InsufficientStock {
            product: product.name.clone(),
            requested: new_quantity,
            available,
        });
    }
    Ok(())
}
