//! Cart-to-order conversion and order lifecycle.

use crate::alerts::LowStockMonitor;
use crate::cart::{Cart, CartStore, CartTotals, Shopper};
use crate::checkout::{Order, OrderLine, OrderStatus, Shipment};
use crate::error::FulfillmentError;
use crate::ids::{AddressId, CustomerId, OrderId, Sku};
use crate::repository::{Repositories, StatusUpdate, StockDecrement};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use turbo_db::{KeyedLocks, Transaction};

/// Compare-and-set attempts before giving up on a status change.
const STATUS_RETRIES: usize = 3;

/// Turns carts into orders and moves orders through their lifecycle.
///
/// Placement holds the same per-customer lock as [`CartStore`], so the
/// stock re-validation and the decrement it guards cannot interleave with
/// another mutation of that customer's cart. Stock races between
/// different customers are settled by the repository's conditional
/// decrement; the loser's unit of work rolls back.
pub struct FulfillmentService {
    repos: Repositories,
    carts: Arc<CartStore>,
    locks: Arc<KeyedLocks<CustomerId>>,
    monitor: Arc<LowStockMonitor>,
}

impl FulfillmentService {
    pub fn new(
        repos: Repositories,
        carts: Arc<CartStore>,
        locks: Arc<KeyedLocks<CustomerId>>,
        monitor: Arc<LowStockMonitor>,
    ) -> Self {
        Self {
            repos,
            carts,
            locks,
            monitor,
        }
    }

    /// Convert the shopper's cart into a pending order.
    ///
    /// All-or-nothing: either every line's stock is decremented, the order
    /// exists and the cart is empty, or none of that happened.
    #[instrument(skip(self, shopper), fields(customer = %shopper.customer_id, store = %shopper.store_id))]
    pub fn place_order(
        &self,
        shopper: &Shopper,
        address_id: &AddressId,
    ) -> Result<Order, FulfillmentError> {
        let (order, decremented) = {
            let _guard = self.locks.lock(&shopper.customer_id);
            self.place_locked(shopper, address_id)?
        };

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.grand_total,
            "order placed"
        );
        self.check_low_stock(shopper, &decremented);
        Ok(order)
    }

    fn place_locked(
        &self,
        shopper: &Shopper,
        address_id: &AddressId,
    ) -> Result<(Order, Vec<(Sku, i64)>), FulfillmentError> {
        let cart = self
            .repos
            .carts
            .load(&shopper.customer_id)?
            .filter(|cart| !cart.is_empty())
            .ok_or(FulfillmentError::EmptyCart)?;
        if cart.store_id != shopper.store_id {
            debug!(cart_store = %cart.store_id, "cart belongs to another store");
            return Err(FulfillmentError::EmptyCart);
        }

        let address = self
            .repos
            .addresses
            .find_address(address_id)?
            .filter(|a| a.is_owned_by(&shopper.customer_id))
            .ok_or_else(|| FulfillmentError::AddressNotFound(address_id.to_string()))?;
        let shipping_cost = self
            .repos
            .shipping
            .find_shipping_cost(&shopper.store_id, &address.region)?
            .ok_or_else(|| FulfillmentError::ShippingUnavailable {
                region: address.region.clone(),
            })?;

        // Fresh prices and stock levels; nothing is written before every
        // line has passed.
        let totals = self.carts.price(&cart)?;
        validate_stock(&totals)?;

        let mut lines = Vec::with_capacity(totals.lines.len());
        for view in &totals.lines {
            lines.push(OrderLine::new(
                view.product_id.clone(),
                view.product_name.clone(),
                view.sku.clone(),
                view.quantity,
                view.list_unit_price,
                view.unit_price,
            )?);
        }
        let shipment = Shipment::new(address.region.clone(), address.one_line(), shipping_cost);
        let order = Order::new(
            shopper.customer_id.clone(),
            shopper.store_id.clone(),
            lines,
            shipment,
            cart.currency(),
        )?;

        let mut tx = Transaction::begin(format!("place-order:{}", order.id));
        let decremented = self.decrement_all(&mut tx, &order)?;

        self.repos.orders.insert(&order)?;
        let orders = Arc::clone(&self.repos.orders);
        let order_id = order.id.clone();
        tx.on_rollback("remove order", move || {
            if let Err(e) = orders.remove(&order_id) {
                error!(%order_id, error = %e, "failed to remove order during rollback");
            }
        });

        self.clear_cart(&mut tx, &cart)?;
        tx.commit();

        Ok((order, decremented))
    }

    fn decrement_all(
        &self,
        tx: &mut Transaction,
        order: &Order,
    ) -> Result<Vec<(Sku, i64)>, FulfillmentError> {
        let reference = order.id.to_string();
        let mut decremented = Vec::with_capacity(order.lines.len());

        for line in &order.lines {
            let outcome = self.repos.inventory.decrement_stock(
                &order.store_id,
                &line.sku,
                line.quantity,
                &reference,
            )?;
            let remaining = match outcome {
                StockDecrement::Applied { remaining } => remaining,
                StockDecrement::Insufficient { available } => {
                    warn!(sku = %line.sku, requested = line.quantity, available, "stock taken concurrently");
                    return Err(FulfillmentError::InsufficientStock {
                        sku: line.sku.to_string(),
                        requested: line.quantity,
                        available,
                    });
                }
                StockDecrement::Missing => {
                    return Err(FulfillmentError::VariantNotFound(line.sku.to_string()));
                }
            };

            let inventory = Arc::clone(&self.repos.inventory);
            let store_id = order.store_id.clone();
            let sku = line.sku.clone();
            let quantity = line.quantity;
            let reference = reference.clone();
            tx.on_rollback(format!("restock {}", line.sku), move || {
                if let Err(e) = inventory.restock(&store_id, &sku, quantity, &reference) {
                    error!(%sku, quantity, error = %e, "failed to release stock during rollback");
                }
            });
            decremented.push((line.sku.clone(), remaining));
        }
        Ok(decremented)
    }

    fn clear_cart(&self, tx: &mut Transaction, cart: &Cart) -> Result<(), FulfillmentError> {
        let mut emptied = cart.clone();
        emptied.clear();
        self.repos.carts.save(&emptied)?;

        let carts = Arc::clone(&self.repos.carts);
        let original = cart.clone();
        tx.on_rollback("restore cart", move || {
            if let Err(e) = carts.save(&original) {
                error!(cart_id = %original.id, error = %e, "failed to restore cart during rollback");
            }
        });
        Ok(())
    }

    /// Hand every variant left at or below its threshold to the monitor.
    /// Nothing here can fail the order.
    fn check_low_stock(&self, shopper: &Shopper, decremented: &[(Sku, i64)]) {
        let catalog = &self.repos.catalog;
        for (sku, remaining) in decremented {
            let variant = match catalog.find_variant_by_sku(&shopper.store_id, sku) {
                Ok(Some(variant)) => variant,
                Ok(None) => continue,
                Err(e) => {
                    warn!(%sku, error = %e, "skipping low-stock check");
                    continue;
                }
            };
            let product = match catalog.find_product(&variant.product_id) {
                Ok(Some(product)) => product,
                Ok(None) => continue,
                Err(e) => {
                    warn!(%sku, error = %e, "skipping low-stock check");
                    continue;
                }
            };

            let mut variant = variant;
            variant.stock = *remaining;
            if product.is_low_stock(&variant) {
                let outcome = self.monitor.notify_if_low(&product, &variant);
                debug!(%sku, stock = variant.stock, ?outcome, "low-stock check");
            }
        }
    }

    /// Move an order along the status state machine.
    #[instrument(skip(self))]
    pub fn update_status(
        &self,
        order_id: &OrderId,
        next: OrderStatus,
    ) -> Result<Order, FulfillmentError> {
        self.transition(order_id, next, |current| {
            FulfillmentError::InvalidStatusTransition {
                from: current,
                to: next,
            }
        })
    }

    /// Cancel a pending order. Stock is not returned.
    #[instrument(skip(self))]
    pub fn cancel_order(&self, order_id: &OrderId) -> Result<Order, FulfillmentError> {
        self.transition(order_id, OrderStatus::Cancelled, FulfillmentError::CannotCancel)
    }

    fn transition(
        &self,
        order_id: &OrderId,
        next: OrderStatus,
        rejected: impl Fn(OrderStatus) -> FulfillmentError,
    ) -> Result<Order, FulfillmentError> {
        let mut current = self.get_order(order_id)?;

        for _ in 0..STATUS_RETRIES {
            if !current.status.can_transition_to(next) {
                debug!(
                    %order_id,
                    from = %current.status,
                    to = %next,
                    terminal = current.status.is_terminal(),
                    "transition rejected"
                );
                return Err(rejected(current.status));
            }
            match self
                .repos
                .orders
                .compare_and_set_status(order_id, current.status, next)?
            {
                StatusUpdate::Updated(order) => {
                    info!(%order_id, from = %current.status, to = %next, "order status changed");
                    return Ok(order);
                }
                StatusUpdate::Stale(latest) => {
                    debug!(%order_id, status = %latest.status, "status changed concurrently, retrying");
                    current = latest;
                }
                StatusUpdate::Missing => {
                    return Err(FulfillmentError::OrderNotFound(order_id.to_string()));
                }
            }
        }

        Err(turbo_db::DbError::Conflict(format!(
            "order {order_id} kept changing status"
        ))
        .into())
    }

    /// Look up an order.
    pub fn get_order(&self, order_id: &OrderId) -> Result<Order, FulfillmentError> {
        self.repos
            .orders
            .find(order_id)?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.to_string()))
    }

    /// A customer's orders, newest first.
    pub fn list_orders(&self, customer_id: &CustomerId) -> Result<Vec<Order>, FulfillmentError> {
        let mut orders = self.repos.orders.list_for_customer(customer_id)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(orders)
    }
}

/// Every line must still be covered by current stock.
fn validate_stock(totals: &CartTotals) -> Result<(), FulfillmentError> {
    match totals.lines.iter().find(|line| !line.is_in_stock()) {
        Some(line) => {
            info!(sku = %line.sku, requested = line.quantity, available = line.available, "stock re-validation failed");
            Err(FulfillmentError::InsufficientStock {
                sku: line.sku.to_string(),
                requested: line.quantity,
                available: line.available,
            })
        }
        None => Ok(()),
    }
}
