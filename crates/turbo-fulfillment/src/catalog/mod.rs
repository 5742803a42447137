//! Catalog module.
//!
//! Products, variants and the stock ledger. Catalog data is owned by the
//! surrounding storefront; this crate only reads it, except for variant
//! stock, which placing an order decrements.

mod inventory;
mod product;

pub use inventory::{AdjustmentReason, StockAdjustment};
pub use product::{Product, Variant};
