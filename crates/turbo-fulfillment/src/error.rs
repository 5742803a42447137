//! Fulfillment error types.

use crate::checkout::OrderStatus;
use thiserror::Error;
use turbo_db::DbError;

/// Errors that can occur in cart and order operations.
///
/// Everything except [`FulfillmentError::FulfillmentFailed`],
/// [`FulfillmentError::Overflow`] and [`FulfillmentError::CurrencyMismatch`]
/// is a validation failure the shopper can act on.
#[derive(Error, Debug)]
pub enum FulfillmentError {
    /// Quantity must be positive.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds the per-line maximum.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// No variant with this SKU in the store.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Cart line not found.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Not enough stock to cover the requested quantity.
    #[error("Insufficient stock for {sku}: requested {requested}, available {available}")]
    InsufficientStock {
        sku: String,
        requested: i64,
        available: i64,
    },

    /// Order placement on a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Delivery address unknown or not owned by the customer.
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// The store does not ship to the address's region.
    #[error("Shipping unavailable for region {region}")]
    ShippingUnavailable { region: String },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Status change not allowed by the order state machine.
    #[error("Invalid order status transition from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Only pending orders can be cancelled.
    #[error("Cannot cancel order in status {0}")]
    CannotCancel(OrderStatus),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Storage failed; the unit of work was rolled back.
    #[error("Fulfillment failed: {0}")]
    FulfillmentFailed(#[from] DbError),
}

impl FulfillmentError {
    /// Whether the error is a validation failure rather than an
    /// infrastructure or data-integrity fault.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            FulfillmentError::FulfillmentFailed(_)
                | FulfillmentError::Overflow
                | FulfillmentError::CurrencyMismatch { .. }
        )
    }

    /// Stable machine-readable code for adapters.
    pub fn code(&self) -> &'static str {
        match self {
            FulfillmentError::InvalidQuantity(_) => "invalid_quantity",
            FulfillmentError::QuantityExceedsLimit(..) => "quantity_exceeds_limit",
            FulfillmentError::VariantNotFound(_) => "variant_not_found",
            FulfillmentError::ProductNotFound(_) => "product_not_found",
            FulfillmentError::LineNotFound(_) => "line_not_found",
            FulfillmentError::InsufficientStock { .. } => "insufficient_stock",
            FulfillmentError::EmptyCart => "empty_cart",
            FulfillmentError::AddressNotFound(_) => "address_not_found",
            FulfillmentError::ShippingUnavailable { .. } => "shipping_unavailable",
            FulfillmentError::OrderNotFound(_) => "order_not_found",
            FulfillmentError::InvalidStatusTransition { .. } => "invalid_status_transition",
            FulfillmentError::CannotCancel(_) => "cannot_cancel",
            FulfillmentError::CurrencyMismatch { .. } => "currency_mismatch",
            FulfillmentError::Overflow => "overflow",
            FulfillmentError::FulfillmentFailed(_) => "fulfillment_failed",
        }
    }
}
