//! Shared test utilities for `Stockbook`.
//!
//! This module provides common helper functions for setting up test applications
//! and creating test entities with sensible defaults.

use chrono::Utc;

use crate::{
    config::AppConfig,
    core::{product, sale},
    errors::Result,
    models::{Product, ProductType, Sale},
    store::Stockbook,
};

/// Creates an application over an in-memory `SQLite` database with tables
/// initialized and all stores hydrated. This is the standard setup for all
/// integration tests.
pub async fn setup_test_app() -> Result<Stockbook> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Stockbook::connect(db, AppConfig::default()).await
}

/// Creates a unit-type test product with sensible defaults.
///
/// # Arguments
/// * `app` - Application handle
/// * `name` - Product name
/// * `quantity` - Opening stock
///
/// # Defaults
/// * `product_type`: `Unit`
/// * `wholesale_price`: 5.0
/// * `retail_price`: 8.0
pub async fn create_test_product(app: &Stockbook, name: &str, quantity: f64) -> Result<Product> {
    product::create_product(
        app,
        product::ProductInput {
            name: name.to_string(),
            product_type: ProductType::Unit,
            wholesale_price: 5.0,
            retail_price: 8.0,
            quantity,
        },
    )
    .await
}

/// Creates a test product with custom parameters.
/// Use this when you need to test specific product configurations.
pub async fn create_custom_product(
    app: &Stockbook,
    name: &str,
    product_type: ProductType,
    wholesale_price: f64,
    retail_price: f64,
    quantity: f64,
) -> Result<Product> {
    product::create_product(
        app,
        product::ProductInput {
            name: name.to_string(),
            product_type,
            wholesale_price,
            retail_price,
            quantity,
        },
    )
    .await
}

/// Records a single-item test sale of `quantity` units of the given product,
/// timestamped now.
pub async fn record_test_sale(app: &Stockbook, product_id: &str, quantity: f64) -> Result<Sale> {
    sale::record_sale(
        app,
        Utc::now(),
        vec![sale::SaleItemRequest {
            product_id: product_id.to_string(),
            quantity,
        }],
    )
    .await
}
