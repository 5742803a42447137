//! Cart-to-order fulfillment for TurboCommerce storefronts.
//!
//! This crate holds the part of a storefront with real invariants:
//!
//! - **Cart**: per-customer carts bounded by variant stock, priced through
//!   each product's discount policy
//! - **Checkout**: converting a cart into an order as one unit of work that
//!   decrements stock, plus the order status state machine
//! - **Alerts**: low-stock notifications gated by threshold and cooldown
//! - **Storage**: repository traits and an in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use turbo_fulfillment::prelude::*;
//!
//! let store = Arc::new(MemoryStore::new());
//! let product = Product::new(ProductId::new("tee"), StoreId::new("shop"), "Tee")
//!     .with_discount(DiscountPolicy::Percentage { percent: 10.0, cap: None });
//! store.put_variant(Variant::new(
//!     Sku::new("TEE-M"),
//!     &product,
//!     5,
//!     Money::new(2000, Currency::USD),
//!     Money::new(700, Currency::USD),
//! ));
//! store.put_product(product);
//! store.put_address(Address::new(AddressId::new("home"), CustomerId::new("ann"), "Bali"));
//! store.put_shipping_rate(ShippingRate::new(
//!     StoreId::new("shop"),
//!     "Bali",
//!     Money::new(500, Currency::USD),
//! ));
//!
//! let engine = CommerceEngine::new(
//!     Repositories::from_store(store.clone()),
//!     Arc::new(LogNotifier),
//!     FulfillmentConfig::default(),
//! );
//! let shopper = Shopper::new("ann", "shop");
//!
//! let totals = engine
//!     .add_line(&shopper, &ProductId::new("tee"), &Sku::new("TEE-M"), 2)
//!     .unwrap();
//! assert_eq!(totals.total_price, Money::new(3600, Currency::USD));
//!
//! let order = engine.place_order(&shopper, &AddressId::new("home")).unwrap();
//! assert_eq!(order.grand_total, Money::new(4100, Currency::USD));
//! assert_eq!(store.variant(&StoreId::new("shop"), &Sku::new("TEE-M")).unwrap().stock, 3);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod alerts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod engine;
pub mod repository;
pub mod storage;

pub use config::{FulfillmentConfig, LowStockConfig};
pub use engine::CommerceEngine;
pub use error::FulfillmentError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{FulfillmentConfig, LowStockConfig};
    pub use crate::engine::CommerceEngine;
    pub use crate::error::FulfillmentError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{AdjustmentReason, Product, StockAdjustment, Variant};

    // Cart
    pub use crate::cart::{
        Cart, CartLine, CartLineView, CartStore, CartTotals, DiscountPolicy, RawDiscount, Shopper,
    };

    // Checkout
    pub use crate::checkout::{
        Address, FulfillmentService, Order, OrderLine, OrderStatus, Shipment, ShipmentStatus,
        ShippingRate,
    };

    // Alerts
    pub use crate::alerts::{
        LogNotifier, LowStockMonitor, MonitorOutcome, Notifier, NotifyError, RecordingNotifier,
    };

    // Storage
    pub use crate::repository::{
        AddressRepository, CartRepository, CatalogRepository, InventoryRepository,
        OrderRepository, RecipientDirectory, Repositories, ShippingRepository, StatusUpdate,
        StockDecrement,
    };
    pub use crate::storage::{MemoryStore, StoreSettings, StoreSnapshot};
}
