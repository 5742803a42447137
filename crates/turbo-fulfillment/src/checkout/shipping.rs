//! Shipping rates and shipment records.

use crate::checkout::OrderStatus;
use crate::ids::{ShipmentId, StoreId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A store's flat shipping cost for one region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingRate {
    /// Store offering the rate.
    pub store_id: StoreId,
    /// Region name, matched case-insensitively.
    pub region: String,
    /// Cost per order.
    pub cost: Money,
}

impl ShippingRate {
    pub fn new(store_id: StoreId, region: impl Into<String>, cost: Money) -> Self {
        Self {
            store_id,
            region: region.into(),
            cost,
        }
    }

    /// Normalized region key.
    pub fn region_key(region: &str) -> String {
        region.trim().to_lowercase()
    }

    /// Check if this is free shipping.
    pub fn is_free(&self) -> bool {
        self.cost.amount_cents == 0
    }
}

/// Shipment progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Waiting to be handed to the carrier.
    #[default]
    Pending,
    /// With the carrier.
    InTransit,
    /// Arrived.
    Delivered,
    /// Will not ship.
    Cancelled,
}

impl ShipmentStatus {
    /// Shipment status implied by an order status.
    pub fn for_order(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => ShipmentStatus::Pending,
            OrderStatus::Shipped => ShipmentStatus::InTransit,
            OrderStatus::Delivered => ShipmentStatus::Delivered,
            OrderStatus::Cancelled => ShipmentStatus::Cancelled,
        }
    }
}

/// The shipment attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    /// Shipment ID.
    pub id: ShipmentId,
    /// Destination region.
    pub region: String,
    /// One-line destination address.
    pub destination: String,
    /// Shipping cost charged.
    pub cost: Money,
    /// Progress.
    pub status: ShipmentStatus,
}

impl Shipment {
    pub fn new(region: impl Into<String>, destination: impl Into<String>, cost: Money) -> Self {
        Self {
            id: ShipmentId::generate(),
            region: region.into(),
            destination: destination.into(),
            cost,
            status: ShipmentStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_region_key_normalizes() {
        assert_eq!(ShippingRate::region_key("  West Java "), "west java");
    }

    #[test]
    fn test_free_shipping() {
        let rate = ShippingRate::new(StoreId::new("s1"), "Bali", Money::zero(Currency::USD));
        assert!(rate.is_free());
    }

    #[test]
    fn test_shipment_status_follows_order() {
        assert_eq!(ShipmentStatus::for_order(OrderStatus::Shipped), ShipmentStatus::InTransit);
        assert_eq!(ShipmentStatus::for_order(OrderStatus::Cancelled), ShipmentStatus::Cancelled);
    }
}
