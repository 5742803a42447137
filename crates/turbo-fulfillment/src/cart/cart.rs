//! Cart and cart line types.
//!
//! The [`Cart`] aggregate validates every mutation against the stock figure
//! it is handed and only touches its lines once validation has passed, so a
//! rejected call leaves it exactly as it was.

use crate::error::FulfillmentError;
use crate::ids::{CartId, CartLineId, CustomerId, ProductId, Sku, StoreId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Default maximum quantity allowed per line.
pub const MAX_QUANTITY_PER_LINE: i64 = 9999;

/// What a quantity update did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Line now holds the new quantity.
    Updated,
    /// Non-positive quantity: the line was dropped.
    Removed,
}

/// A customer's shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Owning customer (one cart per customer).
    pub customer_id: CustomerId,
    /// Store the cart was opened in.
    pub store_id: StoreId,
    /// Lines, in the order they were first added.
    pub lines: Vec<CartLine>,
    /// Cached total, recomputed on every mutation.
    pub total_price: Money,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(customer_id: CustomerId, store_id: StoreId, currency: Currency) -> Self {
        let now = current_timestamp();
        Self {
            id: CartId::generate(),
            customer_id,
            store_id,
            lines: Vec::new(),
            total_price: Money::zero(currency),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add `quantity` units of a variant, merging into an existing line for
    /// the same SKU.
    ///
    /// Returns an error if:
    /// - Quantity is not positive
    /// - The resulting line quantity exceeds `available` stock
    /// - The resulting line quantity exceeds `max_per_line`
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        sku: Sku,
        quantity: i64,
        available: i64,
        max_per_line: i64,
    ) -> Result<CartLineId, FulfillmentError> {
        if quantity <= 0 {
            return Err(FulfillmentError::InvalidQuantity(quantity));
        }

        let existing = self.lines.iter().position(|l| l.sku == sku);
        let current = existing.map(|i| self.lines[i].quantity).unwrap_or(0);
        let new_quantity = current
            .checked_add(quantity)
            .ok_or(FulfillmentError::Overflow)?;
        check_quantity(&sku, new_quantity, available, max_per_line)?;

        let id = match existing {
            Some(i) => {
                self.lines[i].quantity = new_quantity;
                self.lines[i].id.clone()
            }
            None => {
                let line = CartLine::new(product_id, sku, new_quantity);
                let id = line.id.clone();
                self.lines.push(line);
                id
            }
        };
        self.touch();
        Ok(id)
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line instead of failing.
    pub fn set_quantity(
        &mut self,
        line_id: &CartLineId,
        quantity: i64,
        available: i64,
        max_per_line: i64,
    ) -> Result<QuantityChange, FulfillmentError> {
        let Some(index) = self.lines.iter().position(|l| &l.id == line_id) else {
            return Err(FulfillmentError::LineNotFound(line_id.to_string()));
        };

        if quantity <= 0 {
            self.lines.remove(index);
            self.touch();
            return Ok(QuantityChange::Removed);
        }

        check_quantity(&self.lines[index].sku, quantity, available, max_per_line)?;
        self.lines[index].quantity = quantity;
        self.touch();
        Ok(QuantityChange::Updated)
    }

    /// Remove a line. Returns `false` if it was not in the cart.
    pub fn remove_line(&mut self, line_id: &CartLineId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.id != line_id);
        let removed = self.lines.len() < len_before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Clear all lines and reset the total.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.total_price = Money::zero(self.total_price.currency);
        self.touch();
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get a line by ID.
    pub fn get_line(&self, line_id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == line_id)
    }

    /// Get the line holding a SKU.
    pub fn line_by_sku(&self, sku: &Sku) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.sku == sku)
    }

    /// Currency the cart is priced in.
    pub fn currency(&self) -> Currency {
        self.total_price.currency
    }

    fn touch(&mut self) {
        self.updated_at = current_timestamp();
    }
}

fn check_quantity(
    sku: &Sku,
    quantity: i64,
    available: i64,
    max_per_line: i64,
) -> Result<(), FulfillmentError> {
    if quantity > max_per_line {
        return Err(FulfillmentError::QuantityExceedsLimit(quantity, max_per_line));
    }
    if quantity > available {
        return Err(FulfillmentError::InsufficientStock {
            sku: sku.to_string(),
            requested: quantity,
            available,
        });
    }
    Ok(())
}

/// One SKU and its quantity within a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Unique line identifier.
    pub id: CartLineId,
    /// Product the SKU belongs to.
    pub product_id: ProductId,
    /// Variant being purchased.
    pub sku: Sku,
    /// Quantity, always positive.
    pub quantity: i64,
}

impl CartLine {
    /// Create a new line.
    pub fn new(product_id: ProductId, sku: Sku, quantity: i64) -> Self {
        Self {
            id: CartLineId::generate(),
            product_id,
            sku,
            quantity,
        }
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
