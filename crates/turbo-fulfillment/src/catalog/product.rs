//! Product and variant types.

use crate::cart::DiscountPolicy;
use crate::ids::{ProductId, Sku, StoreId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in a store's catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Owning store.
    pub store_id: StoreId,
    /// Product name.
    pub name: String,
    /// Discount applied to every variant's unit price.
    #[serde(default)]
    pub discount: DiscountPolicy,
    /// Stock at or below this level triggers a low-stock alert.
    #[serde(default)]
    pub min_stock_threshold: i64,
}

impl Product {
    /// Create a product with no discount.
    pub fn new(id: ProductId, store_id: StoreId, name: impl Into<String>) -> Self {
        Self {
            id,
            store_id,
            name: name.into(),
            discount: DiscountPolicy::None,
            min_stock_threshold: 0,
        }
    }

    /// Set the discount policy.
    pub fn with_discount(mut self, discount: DiscountPolicy) -> Self {
        self.discount = discount;
        self
    }

    /// Set the low-stock threshold.
    pub fn with_min_stock_threshold(mut self, threshold: i64) -> Self {
        self.min_stock_threshold = threshold;
        self
    }

    /// Effective unit price of one of this product's variants.
    pub fn unit_price(&self, variant: &Variant) -> Money {
        self.discount.apply(variant.unit_price)
    }

    /// Check if a variant's stock is at or below this product's threshold.
    pub fn is_low_stock(&self, variant: &Variant) -> bool {
        variant.stock <= self.min_stock_threshold
    }
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Stock keeping unit, unique per store.
    pub sku: Sku,
    /// Parent product.
    pub product_id: ProductId,
    /// Owning store.
    pub store_id: StoreId,
    /// Variant name (e.g., "Large / Blue").
    #[serde(default)]
    pub name: Option<String>,
    /// Units on hand. Never negative.
    pub stock: i64,
    /// Listed price before discounts.
    pub unit_price: Money,
    /// What one unit costs to produce.
    pub production_cost: Money,
}

impl Variant {
    /// Create a new variant.
    pub fn new(
        sku: Sku,
        product: &Product,
        stock: i64,
        unit_price: Money,
        production_cost: Money,
    ) -> Self {
        Self {
            sku,
            product_id: product.id.clone(),
            store_id: product.store_id.clone(),
            name: None,
            stock: stock.max(0),
            unit_price,
            production_cost,
        }
    }

    /// Check if out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }

    /// Gross margin per unit at list price.
    pub fn unit_margin(&self) -> Option<Money> {
        self.unit_price.try_subtract(&self.production_cost)
    }
}
