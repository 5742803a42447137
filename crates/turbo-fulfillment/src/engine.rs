//! Wiring for the cart store, fulfillment service and low-stock monitor.

use crate::alerts::{LowStockMonitor, Notifier};
use crate::cart::{CartStore, CartTotals, Shopper};
use crate::checkout::{FulfillmentService, Order, OrderStatus};
use crate::config::FulfillmentConfig;
use crate::error::FulfillmentError;
use crate::ids::{AddressId, CartLineId, CustomerId, OrderId, ProductId, Sku};
use crate::repository::Repositories;
use std::sync::Arc;
use turbo_cache::{Clock, SystemClock};
use turbo_db::KeyedLocks;

/// The fulfillment core behind one entry point.
///
/// The cart store and the fulfillment service share a single set of
/// per-customer locks; building them separately with different lock sets
/// would let cart edits race order placement.
pub struct CommerceEngine {
    carts: Arc<CartStore>,
    fulfillment: FulfillmentService,
    monitor: Arc<LowStockMonitor>,
    config: FulfillmentConfig,
}

impl CommerceEngine {
    pub fn new(repos: Repositories, notifier: Arc<dyn Notifier>, config: FulfillmentConfig) -> Self {
        Self::with_clock(repos, notifier, config, Arc::new(SystemClock))
    }

    /// Like [`CommerceEngine::new`], measuring alert cooldowns with `clock`.
    pub fn with_clock(
        repos: Repositories,
        notifier: Arc<dyn Notifier>,
        config: FulfillmentConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let locks = Arc::new(KeyedLocks::new());
        let monitor = Arc::new(LowStockMonitor::with_clock(
            Arc::clone(&repos.recipients),
            notifier,
            &config.low_stock,
            clock,
        ));
        let carts = Arc::new(CartStore::new(repos.clone(), Arc::clone(&locks), config.clone()));
        let fulfillment =
            FulfillmentService::new(repos, Arc::clone(&carts), locks, Arc::clone(&monitor));

        Self {
            carts,
            fulfillment,
            monitor,
            config,
        }
    }

    pub fn carts(&self) -> &CartStore {
        &self.carts
    }

    pub fn fulfillment(&self) -> &FulfillmentService {
        &self.fulfillment
    }

    pub fn monitor(&self) -> &LowStockMonitor {
        &self.monitor
    }

    pub fn config(&self) -> &FulfillmentConfig {
        &self.config
    }

    pub fn add_line(
        &self,
        shopper: &Shopper,
        product_id: &ProductId,
        sku: &Sku,
        quantity: i64,
    ) -> Result<CartTotals, FulfillmentError> {
        self.carts.add_line(shopper, product_id, sku, quantity)
    }

    pub fn update_line_quantity(
        &self,
        shopper: &Shopper,
        line_id: &CartLineId,
        quantity: i64,
    ) -> Result<CartTotals, FulfillmentError> {
        self.carts.update_line_quantity(shopper, line_id, quantity)
    }

    pub fn remove_line(
        &self,
        shopper: &Shopper,
        line_id: &CartLineId,
    ) -> Result<CartTotals, FulfillmentError> {
        self.carts.remove_line(shopper, line_id)
    }

    pub fn clear_cart(&self, shopper: &Shopper) -> Result<CartTotals, FulfillmentError> {
        self.carts.clear(shopper)
    }

    pub fn get_totals(&self, shopper: &Shopper) -> Result<CartTotals, FulfillmentError> {
        self.carts.get_totals(shopper)
    }

    pub fn place_order(
        &self,
        shopper: &Shopper,
        address_id: &AddressId,
    ) -> Result<Order, FulfillmentError> {
        self.fulfillment.place_order(shopper, address_id)
    }

    pub fn update_order_status(
        &self,
        order_id: &OrderId,
        next: OrderStatus,
    ) -> Result<Order, FulfillmentError> {
        self.fulfillment.update_status(order_id, next)
    }

    pub fn cancel_order(&self, order_id: &OrderId) -> Result<Order, FulfillmentError> {
        self.fulfillment.cancel_order(order_id)
    }

    pub fn get_order(&self, order_id: &OrderId) -> Result<Order, FulfillmentError> {
        self.fulfillment.get_order(order_id)
    }

    pub fn list_orders(&self, customer_id: &CustomerId) -> Result<Vec<Order>, FulfillmentError> {
        self.fulfillment.list_orders(customer_id)
    }
}

impl std::fmt::Debug for CommerceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceEngine")
            .field("config", &self.config)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}
