//! Shared fixture for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use turbo_cache::ManualClock;
use turbo_fulfillment::prelude::*;

pub const STORE: &str = "s1";

pub fn usd(cents: i64) -> Money {
    Money::new(cents, Currency::USD)
}

/// Route engine logs through the test harness; `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Shop {
    pub store: Arc<MemoryStore>,
    pub engine: CommerceEngine,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

impl Shop {
    pub fn new() -> Self {
        let store = Arc::new(seed());
        Self::with_repos(store.clone(), Repositories::from_store(store))
    }

    /// Same seed data, with some repositories swapped out.
    pub fn with_repos(store: Arc<MemoryStore>, repos: Repositories) -> Self {
        init_tracing();
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(ManualClock::new());
        let engine = CommerceEngine::with_clock(
            repos,
            notifier.clone(),
            FulfillmentConfig::default(),
            clock.clone(),
        );
        Self {
            store,
            engine,
            notifier,
            clock,
        }
    }

    pub fn shopper(&self, customer: &str) -> Shopper {
        Shopper::new(customer, STORE)
    }

    pub fn add(&self, customer: &str, sku: &str, quantity: i64) -> Result<CartTotals, FulfillmentError> {
        let product = match sku {
            "X" | "Y" => "shirt",
            _ => "mug",
        };
        self.engine.add_line(
            &self.shopper(customer),
            &ProductId::new(product),
            &Sku::new(sku),
            quantity,
        )
    }

    pub fn place(&self, customer: &str) -> Result<Order, FulfillmentError> {
        self.engine
            .place_order(&self.shopper(customer), &AddressId::new(format!("{customer}-home")))
    }

    pub fn stock(&self, sku: &str) -> i64 {
        self.store
            .variant(&StoreId::new(STORE), &Sku::new(sku))
            .map(|v| v.stock)
            .unwrap_or(-1)
    }

    pub fn cart_quantity(&self, customer: &str, sku: &str) -> Option<i64> {
        self.store
            .load_cart(&CustomerId::new(customer))
            .and_then(|cart| cart.line_by_sku(&Sku::new(sku)).map(|l| l.quantity))
    }
}

/// Store s1: "shirt" (Amount 25 off from 50) with X (stock 10, $100) and
/// Y (stock 5, $40); "mug" (threshold 3) with MUG (stock 6, $12).
/// Customers ann, bob and cat live in Java, which ships for $5.
pub fn seed() -> MemoryStore {
    let store = MemoryStore::new();
    store.put_store(StoreSettings {
        id: StoreId::new(STORE),
        name: "Test Shop".into(),
        alert_email: Some("ops@shop.test".into()),
    });

    let shirt = Product::new(ProductId::new("shirt"), StoreId::new(STORE), "Shirt").with_discount(
        DiscountPolicy::Amount {
            value: usd(2500),
            min_purchase: Some(usd(5000)),
            max_cap: None,
        },
    );
    store.put_variant(Variant::new(Sku::new("X"), &shirt, 10, usd(10000), usd(3000)));
    store.put_variant(Variant::new(Sku::new("Y"), &shirt, 5, usd(4000), usd(1500)));
    store.put_product(shirt);

    let mug = Product::new(ProductId::new("mug"), StoreId::new(STORE), "Mug")
        .with_min_stock_threshold(3);
    store.put_variant(Variant::new(Sku::new("MUG"), &mug, 6, usd(1200), usd(300)));
    store.put_product(mug);

    for customer in ["ann", "bob", "cat"] {
        store.put_address(Address::new(
            AddressId::new(format!("{customer}-home")),
            CustomerId::new(customer),
            "Java",
        ));
    }
    store.put_shipping_rate(ShippingRate::new(StoreId::new(STORE), "Java", usd(500)));
    store
}
