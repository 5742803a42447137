//! Cart pricing projection.

use crate::cart::Cart;
use crate::error::FulfillmentError;
use crate::ids::{CartId, CartLineId, CustomerId, ProductId, Sku};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Read-only view of a cart with current prices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Cart ID.
    pub cart_id: CartId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Priced lines, in cart order.
    pub lines: Vec<CartLineView>,
    /// Sum of line totals at list price.
    pub list_total: Money,
    /// Sum of line totals after discounts. This is the cart's total price.
    pub total_price: Money,
}

impl CartTotals {
    /// Price a cart from already-resolved line prices.
    pub fn from_lines(cart: &Cart, lines: Vec<CartLineView>) -> Result<Self, FulfillmentError> {
        let currency = cart.currency();
        let mut list_total = Money::zero(currency);
        let mut total_price = Money::zero(currency);
        for line in &lines {
            list_total = list_total.checked_add(&line.list_unit_price.checked_multiply(line.quantity)?)?;
            total_price = total_price.checked_add(&line.line_total)?;
        }
        Ok(Self {
            cart_id: cart.id.clone(),
            customer_id: cart.customer_id.clone(),
            lines,
            list_total,
            total_price,
        })
    }

    /// Amount saved through discounts.
    pub fn savings(&self) -> Money {
        Money::new(
            self.list_total.amount_cents - self.total_price.amount_cents,
            self.total_price.currency,
        )
    }

    /// Total item count.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check if there is nothing in the cart.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One priced cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineView {
    /// Line ID.
    pub line_id: CartLineId,
    /// Product ID.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub product_name: String,
    /// Variant SKU.
    pub sku: Sku,
    /// Quantity.
    pub quantity: i64,
    /// Listed unit price.
    pub list_unit_price: Money,
    /// Unit price after the product's discount.
    pub unit_price: Money,
    /// `unit_price * quantity`.
    pub line_total: Money,
    /// Units currently in stock.
    pub available: i64,
}

impl CartLineView {
    /// Check if the line can still be fulfilled from current stock.
    pub fn is_in_stock(&self) -> bool {
        self.quantity <= self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::StoreId;
    use crate::money::Currency;

    fn view(qty: i64, list: i64, unit: i64, available: i64) -> CartLineView {
        CartLineView {
            line_id: CartLineId::generate(),
            product_id: ProductId::new("p1"),
            product_name: "Mug".into(),
            sku: Sku::new("MUG"),
            quantity: qty,
            list_unit_price: Money::new(list, Currency::USD),
            unit_price: Money::new(unit, Currency::USD),
            line_total: Money::new(unit * qty, Currency::USD),
            available,
        }
    }

    #[test]
    fn test_totals_and_savings() {
        let cart = Cart::new(CustomerId::new("c1"), StoreId::new("s1"), Currency::USD);
        let totals = CartTotals::from_lines(&cart, vec![view(2, 1000, 900, 5), view(1, 500, 500, 0)]).unwrap();

        assert_eq!(totals.list_total.amount_cents, 2500);
        assert_eq!(totals.total_price.amount_cents, 2300);
        assert_eq!(totals.savings().amount_cents, 200);
        assert_eq!(totals.item_count(), 3);
        assert!(totals.lines[0].is_in_stock());
        assert!(!totals.lines[1].is_in_stock());
    }
}
