//! End-to-end cart and order scenarios against the in-memory store.

mod common;

use common::{usd, Shop, STORE};
use std::sync::{Arc, Barrier};
use std::time::Duration;
use turbo_fulfillment::prelude::*;

#[test]
fn test_add_beyond_stock_leaves_quantity_unchanged() {
    let shop = Shop::new();
    shop.add("ann", "X", 3).unwrap();

    let err = shop.add("ann", "X", 8).unwrap_err();
    assert!(matches!(
        err,
        FulfillmentError::InsufficientStock {
            requested: 11,
            available: 10,
            ..
        }
    ));
    assert_eq!(shop.cart_quantity("ann", "X"), Some(3));
    assert_eq!(
        shop.engine.get_totals(&shop.shopper("ann")).unwrap().total_price,
        usd(3 * 7500)
    );
}

#[test]
fn test_amount_discount_respects_minimum_purchase() {
    let shop = Shop::new();
    shop.add("ann", "X", 1).unwrap();
    let totals = shop.add("ann", "Y", 1).unwrap();

    let unit = |sku: &str| {
        totals
            .lines
            .iter()
            .find(|l| l.sku.as_str() == sku)
            .map(|l| l.unit_price)
    };
    assert_eq!(unit("X"), Some(usd(7500)));
    assert_eq!(unit("Y"), Some(usd(4000)));
    assert_eq!(totals.savings(), usd(2500));
}

#[test]
fn test_concurrent_orders_never_oversell() {
    let shop = Shop::new();
    shop.add("ann", "Y", 3).unwrap();
    shop.add("bob", "Y", 3).unwrap();

    let barrier = Barrier::new(2);
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = ["ann", "bob"]
            .into_iter()
            .map(|customer| {
                let (shop, barrier) = (&shop, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    shop.place(customer)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let placed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(placed, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, FulfillmentError::InsufficientStock { .. })));
    assert_eq!(shop.stock("Y"), 2);
    assert_eq!(shop.store.order_count(), 1);
}

#[test]
fn test_concurrent_orders_for_one_cart_place_once() {
    let shop = Shop::new();
    shop.add("ann", "Y", 3).unwrap();

    let barrier = Barrier::new(4);
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (shop, barrier) = (&shop, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    shop.place("ann")
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, FulfillmentError::EmptyCart)));
    assert_eq!(shop.stock("Y"), 2);
}

#[test]
fn test_zero_quantity_removes_line_and_total() {
    let shop = Shop::new();
    shop.add("ann", "X", 1).unwrap();
    let totals = shop.add("ann", "Y", 2).unwrap();
    let y_line = totals
        .lines
        .iter()
        .find(|l| l.sku.as_str() == "Y")
        .map(|l| l.line_id.clone())
        .unwrap();

    let totals = shop
        .engine
        .update_line_quantity(&shop.shopper("ann"), &y_line, 0)
        .unwrap();
    assert_eq!(totals.lines.len(), 1);
    assert_eq!(totals.total_price, usd(7500));
    assert_eq!(shop.cart_quantity("ann", "Y"), None);
    assert_eq!(
        shop.store.load_cart(&CustomerId::new("ann")).unwrap().total_price,
        usd(7500)
    );
}

#[test]
fn test_shipped_order_cannot_be_cancelled() {
    let shop = Shop::new();
    shop.add("ann", "X", 1).unwrap();
    let order = shop.place("ann").unwrap();
    shop.engine
        .update_order_status(&order.id, OrderStatus::Shipped)
        .unwrap();

    let err = shop.engine.cancel_order(&order.id).unwrap_err();
    assert!(matches!(err, FulfillmentError::CannotCancel(OrderStatus::Shipped)));
    let order = shop.engine.get_order(&order.id).unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.shipment.status, ShipmentStatus::InTransit);
}

#[test]
fn test_order_freezes_discounted_prices() {
    let shop = Shop::new();
    shop.add("ann", "X", 2).unwrap();
    let order = shop.place("ann").unwrap();

    let mut shirt = shop.store.product(&ProductId::new("shirt")).unwrap();
    shirt.discount = DiscountPolicy::None;
    shop.store.put_product(shirt);

    let order = shop.engine.get_order(&order.id).unwrap();
    assert_eq!(order.lines[0].unit_price, usd(7500));
    assert_eq!(order.lines[0].list_unit_price, usd(10000));
    assert_eq!(order.subtotal, usd(15000));
    assert_eq!(order.grand_total, usd(15500));

    let ledger = shop
        .store
        .adjustments(&StoreId::new(STORE), &Sku::new("X"))
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].reason, AdjustmentReason::Sale);
    assert_eq!(ledger[0].reference_id.as_deref(), Some(order.id.as_str()));
}

#[test]
fn test_low_stock_alert_after_order_respects_cooldown() {
    let shop = Shop::new();
    shop.add("ann", "MUG", 2).unwrap();
    shop.place("ann").unwrap();
    assert_eq!(shop.notifier.count(), 0, "stock 4 is above threshold 3");

    shop.add("bob", "MUG", 1).unwrap();
    shop.place("bob").unwrap();
    assert_eq!(shop.notifier.count(), 1);
    let alert = &shop.notifier.sent()[0];
    assert_eq!(alert.recipient, "ops@shop.test");
    assert!(alert.body.contains("3 unit(s)"));

    shop.add("cat", "MUG", 1).unwrap();
    shop.place("cat").unwrap();
    assert_eq!(shop.notifier.count(), 1, "suppressed inside cooldown");

    shop.clock.advance(Duration::from_secs(3601));
    shop.add("ann", "MUG", 1).unwrap();
    shop.place("ann").unwrap();
    assert_eq!(shop.notifier.count(), 2);
    assert_eq!(shop.stock("MUG"), 1);
}

#[test]
fn test_alert_failure_does_not_fail_order() {
    let shop = Shop::new();
    shop.notifier
        .fail_with(NotifyError::Unavailable("smtp down".into()));
    shop.add("ann", "MUG", 4).unwrap();

    let order = shop.place("ann").unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(shop.stock("MUG"), 2);
    assert!(!shop.engine.monitor().is_cooling_down(
        &shop.store.product(&ProductId::new("mug")).unwrap()
    ));
}

#[test]
fn test_cart_survives_state_round_trip() {
    let shop = Shop::new();
    shop.add("ann", "X", 2).unwrap();

    let json = shop.store.to_json().unwrap();
    let restored = Arc::new(MemoryStore::from_json(&json).unwrap());
    let engine = CommerceEngine::new(
        Repositories::from_store(restored.clone()),
        Arc::new(LogNotifier),
        FulfillmentConfig::default(),
    );

    let order = engine
        .place_order(&shop.shopper("ann"), &AddressId::new("ann-home"))
        .unwrap();
    assert_eq!(order.grand_total, usd(15500));
    assert_eq!(
        restored
            .variant(&StoreId::new(STORE), &Sku::new("X"))
            .unwrap()
            .stock,
        8
    );
}
