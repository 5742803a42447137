//! In-memory store backed by `turbo_db` tables.

use crate::cart::Cart;
use crate::catalog::{AdjustmentReason, Product, StockAdjustment, Variant};
use crate::checkout::{Address, Order, OrderStatus, ShippingRate};
use crate::ids::{AddressId, CustomerId, OrderId, ProductId, Sku, StoreId};
use crate::money::Money;
use crate::repository::{
    AddressRepository, CartRepository, CatalogRepository, InventoryRepository, OrderRepository,
    RecipientDirectory, ShippingRepository, StatusUpdate, StockDecrement,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use turbo_db::{DbError, Table};

/// Per-store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    pub id: StoreId,
    pub name: String,
    /// Where low-stock alerts go. No address, no alerts.
    #[serde(default)]
    pub alert_email: Option<String>,
}

/// Serializable copy of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreSnapshot {
    pub stores: Vec<StoreSettings>,
    pub products: Vec<Product>,
    pub variants: Vec<Variant>,
    pub addresses: Vec<Address>,
    pub shipping_rates: Vec<ShippingRate>,
    pub carts: Vec<Cart>,
    pub orders: Vec<Order>,
    pub ledger: Vec<StockAdjustment>,
}

/// Every repository trait over one set of in-process tables.
///
/// Each method is a single table operation, so each is atomic on its own;
/// stock decrements check and write under the variant table's lock.
pub struct MemoryStore {
    stores: Table<StoreId, StoreSettings>,
    products: Table<ProductId, Product>,
    variants: Table<String, Variant>,
    addresses: Table<AddressId, Address>,
    shipping: Table<String, ShippingRate>,
    carts: Table<CustomerId, Cart>,
    orders: Table<OrderId, Order>,
    ledger: Mutex<Vec<StockAdjustment>>,
}

fn variant_key(store_id: &StoreId, sku: &Sku) -> String {
    format!("{store_id}/{sku}")
}

fn shipping_key(store_id: &StoreId, region: &str) -> String {
    format!("{store_id}/{}", ShippingRate::region_key(region))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            stores: Table::new("stores"),
            products: Table::new("products"),
            variants: Table::new("variants"),
            addresses: Table::new("addresses"),
            shipping: Table::new("shipping_rates"),
            carts: Table::new("carts"),
            orders: Table::new("orders"),
            ledger: Mutex::new(Vec::new()),
        }
    }

    pub fn put_store(&self, store: StoreSettings) {
        self.stores.insert(store.id.clone(), store);
    }

    pub fn put_product(&self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn put_variant(&self, variant: Variant) {
        self.variants
            .insert(variant_key(&variant.store_id, &variant.sku), variant);
    }

    pub fn put_address(&self, address: Address) {
        self.addresses.insert(address.id.clone(), address);
    }

    pub fn put_shipping_rate(&self, rate: ShippingRate) {
        self.shipping
            .insert(shipping_key(&rate.store_id, &rate.region), rate);
    }

    /// Current copy of a variant.
    pub fn variant(&self, store_id: &StoreId, sku: &Sku) -> Option<Variant> {
        self.variants.get(&variant_key(store_id, sku))
    }

    pub fn product(&self, product_id: &ProductId) -> Option<Product> {
        self.products.get(product_id)
    }

    pub fn load_cart(&self, customer_id: &CustomerId) -> Option<Cart> {
        self.carts.get(customer_id)
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn stores(&self) -> Vec<StoreSettings> {
        let mut rows = self.stores.rows();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows.into_iter().map(|(_, s)| s).collect()
    }

    /// Variants of a store, ordered by SKU.
    pub fn variants_in(&self, store_id: &StoreId) -> Vec<Variant> {
        let mut variants = self.variants.filter(|v| &v.store_id == store_id);
        variants.sort_by(|a, b| a.sku.cmp(&b.sku));
        variants
    }

    /// Copy every table, in a stable order.
    pub fn snapshot(&self) -> StoreSnapshot {
        fn sorted<K: Ord, V>(mut rows: Vec<(K, V)>) -> Vec<V> {
            rows.sort_by(|a, b| a.0.cmp(&b.0));
            rows.into_iter().map(|(_, v)| v).collect()
        }

        StoreSnapshot {
            stores: sorted(self.stores.rows()),
            products: sorted(self.products.rows()),
            variants: sorted(self.variants.rows()),
            addresses: sorted(self.addresses.rows()),
            shipping_rates: sorted(self.shipping.rows()),
            carts: sorted(self.carts.rows()),
            orders: sorted(self.orders.rows()),
            ledger: self.ledger.lock().clone(),
        }
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        snapshot.stores.into_iter().for_each(|s| store.put_store(s));
        snapshot.products.into_iter().for_each(|p| store.put_product(p));
        snapshot.variants.into_iter().for_each(|v| store.put_variant(v));
        snapshot.addresses.into_iter().for_each(|a| store.put_address(a));
        snapshot
            .shipping_rates
            .into_iter()
            .for_each(|r| store.put_shipping_rate(r));
        for cart in snapshot.carts {
            store.carts.insert(cart.customer_id.clone(), cart);
        }
        for order in snapshot.orders {
            store.orders.insert(order.id.clone(), order);
        }
        *store.ledger.lock() = snapshot.ledger;
        store
    }

    pub fn to_json(&self) -> Result<String, DbError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self, DbError> {
        Ok(Self::from_snapshot(serde_json::from_str(json)?))
    }

    fn record(&self, adjustment: StockAdjustment) {
        self.ledger.lock().push(adjustment);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("products", &self.products.len())
            .field("variants", &self.variants.len())
            .field("carts", &self.carts.len())
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

impl CatalogRepository for MemoryStore {
    fn find_variant_by_sku(&self, store_id: &StoreId, sku: &Sku) -> Result<Option<Variant>, DbError> {
        Ok(self.variant(store_id, sku))
    }

    fn find_product(&self, product_id: &ProductId) -> Result<Option<Product>, DbError> {
        Ok(self.products.get(product_id))
    }
}

impl InventoryRepository for MemoryStore {
    fn decrement_stock(
        &self,
        store_id: &StoreId,
        sku: &Sku,
        quantity: i64,
        reference: &str,
    ) -> Result<StockDecrement, DbError> {
        if quantity <= 0 {
            return Err(DbError::Conflict(format!(
                "cannot decrement {sku} by {quantity}"
            )));
        }
        let outcome = self.variants.update(&variant_key(store_id, sku), |variant| {
            if variant.stock < quantity {
                return Ok::<_, DbError>(StockDecrement::Insufficient {
                    available: variant.stock,
                });
            }
            variant.stock -= quantity;
            Ok(StockDecrement::Applied {
                remaining: variant.stock,
            })
        })?;

        let outcome = outcome.unwrap_or(StockDecrement::Missing);
        if let StockDecrement::Applied { remaining } = outcome {
            debug!(%sku, quantity, remaining, "stock decremented");
            self.record(
                StockAdjustment::new(
                    store_id.clone(),
                    sku.clone(),
                    -quantity,
                    remaining,
                    AdjustmentReason::Sale,
                )
                .with_reference(reference),
            );
        }
        Ok(outcome)
    }

    fn restock(
        &self,
        store_id: &StoreId,
        sku: &Sku,
        quantity: i64,
        reference: &str,
    ) -> Result<i64, DbError> {
        let key = variant_key(store_id, sku);
        let stock = self
            .variants
            .update(&key, |variant| {
                variant.stock += quantity;
                Ok::<_, DbError>(variant.stock)
            })?
            .ok_or(DbError::NotFound {
                table: self.variants.name(),
                key,
            })?;

        debug!(%sku, quantity, stock, "stock released");
        self.record(
            StockAdjustment::new(
                store_id.clone(),
                sku.clone(),
                quantity,
                stock,
                AdjustmentReason::Release,
            )
            .with_reference(reference),
        );
        Ok(stock)
    }

    fn adjustments(&self, store_id: &StoreId, sku: &Sku) -> Result<Vec<StockAdjustment>, DbError> {
        Ok(self
            .ledger
            .lock()
            .iter()
            .filter(|a| &a.store_id == store_id && &a.sku == sku)
            .cloned()
            .collect())
    }
}

impl CartRepository for MemoryStore {
    fn load(&self, customer_id: &CustomerId) -> Result<Option<Cart>, DbError> {
        Ok(self.carts.get(customer_id))
    }

    fn save(&self, cart: &Cart) -> Result<(), DbError> {
        self.carts.insert(cart.customer_id.clone(), cart.clone());
        Ok(())
    }
}

impl OrderRepository for MemoryStore {
    fn insert(&self, order: &Order) -> Result<(), DbError> {
        self.orders.insert_new(order.id.clone(), order.clone())
    }

    fn find(&self, order_id: &OrderId) -> Result<Option<Order>, DbError> {
        Ok(self.orders.get(order_id))
    }

    fn list_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>, DbError> {
        Ok(self.orders.filter(|o| &o.customer_id == customer_id))
    }

    fn remove(&self, order_id: &OrderId) -> Result<(), DbError> {
        self.orders.remove(order_id);
        Ok(())
    }

    fn compare_and_set_status(
        &self,
        order_id: &OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<StatusUpdate, DbError> {
        let outcome = self.orders.update(order_id, |order| {
            if order.status != expected {
                return Ok::<_, DbError>(StatusUpdate::Stale(order.clone()));
            }
            order.apply_status(next);
            Ok(StatusUpdate::Updated(order.clone()))
        })?;
        Ok(outcome.unwrap_or(StatusUpdate::Missing))
    }
}

impl AddressRepository for MemoryStore {
    fn find_address(&self, address_id: &AddressId) -> Result<Option<Address>, DbError> {
        Ok(self.addresses.get(address_id))
    }
}

impl ShippingRepository for MemoryStore {
    fn find_shipping_cost(&self, store_id: &StoreId, region: &str) -> Result<Option<Money>, DbError> {
        Ok(self.shipping.get(&shipping_key(store_id, region)).map(|r| r.cost))
    }
}

impl RecipientDirectory for MemoryStore {
    fn alert_recipient(&self, store_id: &StoreId) -> Result<Option<String>, DbError> {
        Ok(self
            .stores
            .get(store_id)
            .and_then(|s| s.alert_email)
            .filter(|email| !email.trim().is_empty()))
    }
}
