//! Data-access interfaces.
//!
//! The engine never talks to storage directly; it goes through these
//! object-safe traits so the storefront can plug in its own persistence.
//! [`crate::storage::MemoryStore`] implements all of them.

use crate::cart::Cart;
use crate::catalog::{Product, StockAdjustment, Variant};
use crate::checkout::{Address, Order, OrderStatus};
use crate::ids::{AddressId, CustomerId, OrderId, ProductId, Sku, StoreId};
use crate::money::Money;
use std::sync::Arc;
use turbo_db::DbError;

/// Read access to products and variants.
pub trait CatalogRepository: Send + Sync {
    /// Look up a variant by SKU within a store.
    fn find_variant_by_sku(&self, store_id: &StoreId, sku: &Sku) -> Result<Option<Variant>, DbError>;

    /// Look up a product.
    fn find_product(&self, product_id: &ProductId) -> Result<Option<Product>, DbError>;
}

/// Result of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock covered the quantity and was reduced.
    Applied { remaining: i64 },
    /// Stock did not cover the quantity; nothing changed.
    Insufficient { available: i64 },
    /// No such variant.
    Missing,
}

/// Write access to variant stock.
pub trait InventoryRepository: Send + Sync {
    /// Atomically subtract `quantity` if at least that much is in stock.
    fn decrement_stock(
        &self,
        store_id: &StoreId,
        sku: &Sku,
        quantity: i64,
        reference: &str,
    ) -> Result<StockDecrement, DbError>;

    /// Put units back, returning the new stock level.
    fn restock(
        &self,
        store_id: &StoreId,
        sku: &Sku,
        quantity: i64,
        reference: &str,
    ) -> Result<i64, DbError>;

    /// Ledger entries for a variant, oldest first.
    fn adjustments(&self, store_id: &StoreId, sku: &Sku) -> Result<Vec<StockAdjustment>, DbError>;
}

/// Cart persistence, one cart per customer.
pub trait CartRepository: Send + Sync {
    fn load(&self, customer_id: &CustomerId) -> Result<Option<Cart>, DbError>;
    fn save(&self, cart: &Cart) -> Result<(), DbError>;
}

/// Outcome of a compare-and-set on an order's status.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// Status matched the expectation and was replaced.
    Updated(Order),
    /// Someone else changed the status first; carries the current order.
    Stale(Order),
    /// No such order.
    Missing,
}

/// Order persistence.
pub trait OrderRepository: Send + Sync {
    fn insert(&self, order: &Order) -> Result<(), DbError>;
    fn find(&self, order_id: &OrderId) -> Result<Option<Order>, DbError>;
    fn list_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>, DbError>;
    fn remove(&self, order_id: &OrderId) -> Result<(), DbError>;

    /// Move an order from `expected` to `next` only if it is still in
    /// `expected`.
    fn compare_and_set_status(
        &self,
        order_id: &OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<StatusUpdate, DbError>;
}

/// Customer delivery addresses.
pub trait AddressRepository: Send + Sync {
    fn find_address(&self, address_id: &AddressId) -> Result<Option<Address>, DbError>;
}

/// Per-store shipping rates.
pub trait ShippingRepository: Send + Sync {
    /// Shipping cost for a region, if the store ships there.
    fn find_shipping_cost(&self, store_id: &StoreId, region: &str) -> Result<Option<Money>, DbError>;
}

/// Who receives a store's operational alerts.
pub trait RecipientDirectory: Send + Sync {
    fn alert_recipient(&self, store_id: &StoreId) -> Result<Option<String>, DbError>;
}

/// Every repository the engine needs, bundled for wiring.
#[derive(Clone)]
pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub shipping: Arc<dyn ShippingRepository>,
    pub recipients: Arc<dyn RecipientDirectory>,
}

impl Repositories {
    /// Use one store for every concern.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CatalogRepository
            + InventoryRepository
            + CartRepository
            + OrderRepository
            + AddressRepository
            + ShippingRepository
            + RecipientDirectory
            + 'static,
    {
        Self {
            catalog: store.clone(),
            inventory: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            addresses: store.clone(),
            shipping: store.clone(),
            recipients: store,
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
