//! Cart persistence service.

use crate::cart::{Cart, CartLineView, CartTotals, QuantityChange};
use crate::config::FulfillmentConfig;
use crate::error::FulfillmentError;
use crate::ids::{CartLineId, CustomerId, ProductId, Sku, StoreId};
use crate::repository::Repositories;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use turbo_db::KeyedLocks;

/// The already-authenticated customer an operation runs for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shopper {
    pub customer_id: CustomerId,
    pub store_id: StoreId,
}

impl Shopper {
    pub fn new(customer_id: impl Into<CustomerId>, store_id: impl Into<StoreId>) -> Self {
        Self {
            customer_id: customer_id.into(),
            store_id: store_id.into(),
        }
    }
}

/// Owns every customer's cart.
///
/// Mutations for one customer are serialized through a per-customer lock
/// that [`crate::checkout::FulfillmentService`] shares, so a quantity edit
/// can never interleave with an order placement for the same cart. Each
/// mutation works on a copy of the cart and saves it, with its recomputed
/// total, only after every check passed.
pub struct CartStore {
    repos: Repositories,
    locks: Arc<KeyedLocks<CustomerId>>,
    config: FulfillmentConfig,
}

impl CartStore {
    pub fn new(
        repos: Repositories,
        locks: Arc<KeyedLocks<CustomerId>>,
        config: FulfillmentConfig,
    ) -> Self {
        Self {
            repos,
            locks,
            config,
        }
    }

    /// Add units of a variant to the shopper's cart.
    #[instrument(skip(self, shopper), fields(customer = %shopper.customer_id))]
    pub fn add_line(
        &self,
        shopper: &Shopper,
        product_id: &ProductId,
        sku: &Sku,
        quantity: i64,
    ) -> Result<CartTotals, FulfillmentError> {
        if quantity <= 0 {
            return Err(FulfillmentError::InvalidQuantity(quantity));
        }
        let _guard = self.locks.lock(&shopper.customer_id);

        let mut cart = self.load_or_create(shopper)?;
        if cart.store_id != shopper.store_id {
            // Lines are priced and stocked in the cart's store only.
            if !cart.is_empty() {
                debug!(cart_store = %cart.store_id, "cart holds lines from another store");
                return Err(FulfillmentError::VariantNotFound(sku.to_string()));
            }
            cart.store_id = shopper.store_id.clone();
        }

        let variant = self
            .repos
            .catalog
            .find_variant_by_sku(&cart.store_id, sku)?
            .filter(|v| &v.product_id == product_id)
            .ok_or_else(|| FulfillmentError::VariantNotFound(sku.to_string()))?;

        let line_id = cart.add_line(
            product_id.clone(),
            sku.clone(),
            quantity,
            variant.stock,
            self.config.max_quantity_per_line,
        )?;

        let totals = self.save_priced(&mut cart)?;
        info!(%sku, %line_id, quantity, total = %totals.total_price, "added to cart");
        Ok(totals)
    }

    /// Set a line's quantity; zero or less removes the line.
    #[instrument(skip(self, shopper), fields(customer = %shopper.customer_id))]
    pub fn update_line_quantity(
        &self,
        shopper: &Shopper,
        line_id: &CartLineId,
        quantity: i64,
    ) -> Result<CartTotals, FulfillmentError> {
        let _guard = self.locks.lock(&shopper.customer_id);

        let mut cart = self
            .repos
            .carts
            .load(&shopper.customer_id)?
            .ok_or_else(|| FulfillmentError::LineNotFound(line_id.to_string()))?;
        let line = cart
            .get_line(line_id)
            .ok_or_else(|| FulfillmentError::LineNotFound(line_id.to_string()))?;

        let available = if quantity > 0 {
            self.repos
                .catalog
                .find_variant_by_sku(&cart.store_id, &line.sku)?
                .map(|v| v.stock)
                .ok_or_else(|| FulfillmentError::VariantNotFound(line.sku.to_string()))?
        } else {
            0
        };

        let change = cart.set_quantity(line_id, quantity, available, self.config.max_quantity_per_line)?;
        let totals = self.save_priced(&mut cart)?;
        match change {
            QuantityChange::Updated => info!(%line_id, quantity, "cart line updated"),
            QuantityChange::Removed => info!(%line_id, "cart line removed by zero quantity"),
        }
        Ok(totals)
    }

    /// Remove a line. Removing a line that is not there is a no-op.
    #[instrument(skip(self, shopper), fields(customer = %shopper.customer_id))]
    pub fn remove_line(
        &self,
        shopper: &Shopper,
        line_id: &CartLineId,
    ) -> Result<CartTotals, FulfillmentError> {
        let _guard = self.locks.lock(&shopper.customer_id);

        let Some(mut cart) = self.repos.carts.load(&shopper.customer_id)? else {
            return self.empty_totals(shopper);
        };
        if !cart.remove_line(line_id) {
            debug!(%line_id, "line already gone");
            return self.price(&cart);
        }
        let totals = self.save_priced(&mut cart)?;
        info!(%line_id, "cart line removed");
        Ok(totals)
    }

    /// Remove every line.
    #[instrument(skip(self, shopper), fields(customer = %shopper.customer_id))]
    pub fn clear(&self, shopper: &Shopper) -> Result<CartTotals, FulfillmentError> {
        let _guard = self.locks.lock(&shopper.customer_id);

        let Some(mut cart) = self.repos.carts.load(&shopper.customer_id)? else {
            return self.empty_totals(shopper);
        };
        cart.clear();
        self.repos.carts.save(&cart)?;
        info!("cart cleared");
        self.price(&cart)
    }

    /// Current lines and totals, freshly priced. Takes no lock.
    pub fn get_totals(&self, shopper: &Shopper) -> Result<CartTotals, FulfillmentError> {
        match self.repos.carts.load(&shopper.customer_id)? {
            Some(cart) => self.price(&cart),
            None => self.empty_totals(shopper),
        }
    }

    /// Price every line at current catalog prices.
    pub(crate) fn price(&self, cart: &Cart) -> Result<CartTotals, FulfillmentError> {
        let catalog = &self.repos.catalog;
        let mut views = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let variant = catalog
                .find_variant_by_sku(&cart.store_id, &line.sku)?
                .ok_or_else(|| FulfillmentError::VariantNotFound(line.sku.to_string()))?;
            let product = catalog
                .find_product(&variant.product_id)?
                .ok_or_else(|| FulfillmentError::ProductNotFound(variant.product_id.to_string()))?;

            let unit_price = product.unit_price(&variant);
            views.push(CartLineView {
                line_id: line.id.clone(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                sku: line.sku.clone(),
                quantity: line.quantity,
                list_unit_price: variant.unit_price,
                unit_price,
                line_total: unit_price.checked_multiply(line.quantity)?,
                available: variant.stock,
            });
        }
        CartTotals::from_lines(cart, views)
    }

    fn save_priced(&self, cart: &mut Cart) -> Result<CartTotals, FulfillmentError> {
        let totals = self.price(cart)?;
        cart.total_price = totals.total_price;
        self.repos.carts.save(cart)?;
        Ok(totals)
    }

    fn load_or_create(&self, shopper: &Shopper) -> Result<Cart, FulfillmentError> {
        Ok(self
            .repos
            .carts
            .load(&shopper.customer_id)?
            .unwrap_or_else(|| {
                debug!(customer = %shopper.customer_id, "opening new cart");
                Cart::new(
                    shopper.customer_id.clone(),
                    shopper.store_id.clone(),
                    self.config.currency,
                )
            }))
    }

    fn empty_totals(&self, shopper: &Shopper) -> Result<CartTotals, FulfillmentError> {
        let cart = Cart::new(
            shopper.customer_id.clone(),
            shopper.store_id.clone(),
            self.config.currency,
        );
        CartTotals::from_lines(&cart, Vec::new())
    }
}
