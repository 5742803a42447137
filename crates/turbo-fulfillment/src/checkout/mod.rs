//! Checkout module.
//!
//! Addresses, shipping, orders and the service that turns a cart into an
//! order.

mod address;
mod fulfillment;
mod order;
mod shipping;

pub use address::Address;
pub use fulfillment::FulfillmentService;
pub use order::{Order, OrderLine, OrderStatus};
pub use shipping::{Shipment, ShipmentStatus, ShippingRate};
