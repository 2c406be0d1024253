//! Core business logic - framework-agnostic operations over the entity stores.
//!
//! Everything here takes the [`crate::store::Stockbook`] handle and returns `Result`
//! values; nothing panics for expected domain conditions. The presentation layer is a
//! consumer of these functions and of the stores' subscription streams.

pub mod analytics;
pub mod backup;
pub mod notification;
pub mod product;
pub mod sale;
pub mod stock;
