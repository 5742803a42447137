//! Order types.

use crate::checkout::{Shipment, ShipmentStatus};
use crate::error::FulfillmentError;
use crate::ids::{CustomerId, OrderId, OrderLineId, ProductId, Sku, StoreId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// ```text
/// Pending ──▶ Shipped ──▶ Delivered
///    │
///    └──────▶ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting shipment.
    #[default]
    Pending,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" | "canceled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if the state machine allows moving to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Shipped)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        *self == OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed order. Lines are a frozen snapshot of the cart at checkout;
/// only the status (and the shipment status tracking it) changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
    /// Store the order was placed in.
    pub store_id: StoreId,
    /// Order status.
    pub status: OrderStatus,
    /// Items in the order.
    pub lines: Vec<OrderLine>,
    /// Shipment record.
    pub shipment: Shipment,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Shipping cost.
    pub shipping_total: Money,
    /// Grand total charged.
    pub grand_total: Money,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    /// Unix timestamp when cancelled (if applicable).
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Build a pending order from priced lines.
    pub fn new(
        customer_id: CustomerId,
        store_id: StoreId,
        lines: Vec<OrderLine>,
        shipment: Shipment,
        currency: Currency,
    ) -> Result<Self, FulfillmentError> {
        let mut subtotal = Money::zero(currency);
        for line in &lines {
            subtotal = subtotal.checked_add(&line.total_price)?;
        }
        let grand_total = subtotal.checked_add(&shipment.cost)?;
        let now = current_timestamp();

        Ok(Self {
            id: OrderId::generate(),
            order_number: Self::generate_order_number(),
            customer_id,
            store_id,
            status: OrderStatus::Pending,
            lines,
            shipping_total: shipment.cost,
            shipment,
            subtotal,
            grand_total,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        })
    }

    /// Generate a new order number.
    pub fn generate_order_number() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        static SEQUENCE: AtomicU64 = AtomicU64::new(1);

        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("ORD-{}-{:04}", current_timestamp(), seq % 10_000)
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Move to `next` without checking the state machine. Callers validate
    /// first; the repository applies this inside its compare-and-set.
    pub fn apply_status(&mut self, next: OrderStatus) {
        let now = current_timestamp();
        self.status = next;
        self.shipment.status = ShipmentStatus::for_order(next);
        self.updated_at = now;
        if next == OrderStatus::Cancelled {
            self.cancelled_at = Some(now);
        }
    }
}

/// A line in an order, frozen at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Unique line identifier.
    pub id: OrderLineId,
    /// Product ID.
    pub product_id: ProductId,
    /// Product name at time of order.
    pub product_name: String,
    /// SKU at time of order.
    pub sku: Sku,
    /// Quantity ordered.
    pub quantity: i64,
    /// Listed unit price at time of order.
    pub list_unit_price: Money,
    /// Discounted unit price actually charged.
    pub unit_price: Money,
    /// `unit_price * quantity`.
    pub total_price: Money,
}

impl OrderLine {
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        sku: Sku,
        quantity: i64,
        list_unit_price: Money,
        unit_price: Money,
    ) -> Result<Self, FulfillmentError> {
        Ok(Self {
            id: OrderLineId::generate(),
            product_id,
            product_name: product_name.into(),
            sku,
            quantity,
            list_unit_price,
            unit_price,
            total_price: unit_price.checked_multiply(quantity)?,
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn order() -> Order {
        let line = OrderLine::new(
            ProductId::new("p1"),
            "Mug",
            Sku::new("MUG"),
            3,
            usd(1000),
            usd(800),
        )
        .unwrap();
        Order::new(
            CustomerId::new("c1"),
            StoreId::new("s1"),
            vec![line],
            Shipment::new("Java", "Bandung, Java", usd(500)),
            Currency::USD,
        )
        .unwrap()
    }

    #[test]
    fn test_order_totals() {
        let order = order();
        assert_eq!(order.subtotal, usd(2400));
        assert_eq!(order.shipping_total, usd(500));
        assert_eq!(order.grand_total, usd(2900));
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_number.starts_with("ORD-"));
    }

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;
        let all = [Pending, Shipped, Delivered, Cancelled];
        let allowed: Vec<_> = all
            .iter()
            .flat_map(|from| all.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();
        assert_eq!(
            allowed,
            vec![(Pending, Shipped), (Pending, Cancelled), (Shipped, Delivered)]
        );
    }

    #[test]
    fn test_order_status_can_cancel() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_apply_status_tracks_shipment() {
        let mut order = order();
        order.apply_status(OrderStatus::Cancelled);
        assert_eq!(order.shipment.status, ShipmentStatus::Cancelled);
        assert!(order.cancelled_at.is_some());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(OrderStatus::from_str("Shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::from_str("canceled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::from_str("lost"), None);
        assert_eq!(OrderStatus::Delivered.to_string(), "delivered");
    }
}
