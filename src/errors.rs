//! Unified error types and result handling.
//!
//! Expected domain conditions (validation failures, not-found lookups, insufficient
//! stock) are explicit `Err` values and never panic. Persistence failures carry the
//! underlying `sea_orm` error; the store layer decides whether they are fatal.

use thiserror::Error;

/// All failure conditions surfaced by the store and core operation layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Malformed input rejected at the operation boundary.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of the rejected input
        message: String,
    },

    /// A quantity that is negative, non-finite, or fractional for a unit-counted product.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: f64,
    },

    /// A price that is negative or non-finite.
    #[error("Invalid price: {amount}")]
    InvalidPrice {
        /// The rejected amount
        amount: f64,
    },

    /// Lookup referenced a product id with no matching record.
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The id that failed to resolve
        id: String,
    },

    /// Lookup referenced a sale id with no matching record.
    #[error("Sale not found: {id}")]
    SaleNotFound {
        /// The id that failed to resolve
        id: String,
    },

    /// An edit referenced a sale item id not present in the sale.
    #[error("Sale item not found: {id}")]
    SaleItemNotFound {
        /// The id that failed to resolve
        id: String,
    },

    /// Lookup referenced a notification id with no matching record.
    #[error("Notification not found: {id}")]
    NotificationNotFound {
        /// The id that failed to resolve
        id: String,
    },

    /// Recording or re-quantifying a sale would drive a product's stock negative.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Display name of the product that ran short
        product: String,
        /// Quantity the operation asked for
        requested: f64,
        /// Quantity actually available to the operation
        available: f64,
    },

    /// A backup payload failed validation; no state was changed.
    #[error("Backup parse error: {message}")]
    BackupParse {
        /// Underlying deserialization failure
        message: String,
    },

    /// Database error from the persistence layer.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON encoding error from the backup codec.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
