//! Placement rolls back every write when storage fails part-way.

mod common;

use common::{Shop, STORE};
use std::sync::Arc;
use turbo_db::DbError;
use turbo_fulfillment::prelude::*;

/// Orders table that refuses inserts.
struct OrdersDown(Arc<MemoryStore>);

impl OrderRepository for OrdersDown {
    fn insert(&self, _order: &Order) -> Result<(), DbError> {
        Err(DbError::Unavailable("orders table offline".into()))
    }

    fn find(&self, order_id: &OrderId) -> Result<Option<Order>, DbError> {
        self.0.find(order_id)
    }

    fn list_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>, DbError> {
        self.0.list_for_customer(customer_id)
    }

    fn remove(&self, order_id: &OrderId) -> Result<(), DbError> {
        OrderRepository::remove(self.0.as_ref(), order_id)
    }

    fn compare_and_set_status(
        &self,
        order_id: &OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<StatusUpdate, DbError> {
        self.0.compare_and_set_status(order_id, expected, next)
    }
}

/// Carts that can be loaded and filled but not emptied.
struct CartsCannotClear(Arc<MemoryStore>);

impl CartRepository for CartsCannotClear {
    fn load(&self, customer_id: &CustomerId) -> Result<Option<Cart>, DbError> {
        self.0.load(customer_id)
    }

    fn save(&self, cart: &Cart) -> Result<(), DbError> {
        if cart.is_empty() {
            return Err(DbError::Conflict("cart write rejected".into()));
        }
        self.0.save(cart)
    }
}

/// Catalog that reports every variant as well stocked, so validation
/// passes and the conditional decrement is what catches the shortfall.
struct StaleCatalog(Arc<MemoryStore>);

impl CatalogRepository for StaleCatalog {
    fn find_variant_by_sku(&self, store_id: &StoreId, sku: &Sku) -> Result<Option<Variant>, DbError> {
        Ok(self.0.find_variant_by_sku(store_id, sku)?.map(|mut variant| {
            variant.stock = 100;
            variant
        }))
    }

    fn find_product(&self, product_id: &ProductId) -> Result<Option<Product>, DbError> {
        self.0.find_product(product_id)
    }
}

fn shop_with(f: impl FnOnce(&Arc<MemoryStore>, &mut Repositories)) -> Shop {
    let store = Arc::new(common::seed());
    let mut repos = Repositories::from_store(store.clone());
    f(&store, &mut repos);
    Shop::with_repos(store, repos)
}

#[test]
fn test_failed_order_insert_restores_stock() {
    let shop = shop_with(|store, repos| repos.orders = Arc::new(OrdersDown(store.clone())));
    shop.add("ann", "X", 2).unwrap();
    shop.add("ann", "MUG", 5).unwrap();

    let err = shop.place("ann").unwrap_err();
    assert!(matches!(err, FulfillmentError::FulfillmentFailed(DbError::Unavailable(_))));
    assert!(!err.is_user_facing());

    assert_eq!(shop.stock("X"), 10);
    assert_eq!(shop.stock("MUG"), 6);
    assert_eq!(shop.store.order_count(), 0);
    assert_eq!(shop.cart_quantity("ann", "X"), Some(2));
    assert_eq!(shop.notifier.count(), 0, "no alert for a rolled-back sale");

    let releases: Vec<_> = shop
        .store
        .adjustments(&StoreId::new(STORE), &Sku::new("MUG"))
        .unwrap()
        .into_iter()
        .map(|a| a.reason)
        .collect();
    assert_eq!(releases, vec![AdjustmentReason::Sale, AdjustmentReason::Release]);
}

#[test]
fn test_failed_cart_clear_removes_order_and_restores_stock() {
    let shop = shop_with(|store, repos| repos.carts = Arc::new(CartsCannotClear(store.clone())));
    shop.add("ann", "Y", 3).unwrap();

    let err = shop.place("ann").unwrap_err();
    assert!(matches!(err, FulfillmentError::FulfillmentFailed(DbError::Conflict(_))));

    assert_eq!(shop.stock("Y"), 5);
    assert_eq!(shop.store.order_count(), 0);
    assert!(shop
        .engine
        .list_orders(&CustomerId::new("ann"))
        .unwrap()
        .is_empty());
    assert_eq!(shop.cart_quantity("ann", "Y"), Some(3));
}

#[test]
fn test_second_line_short_leaves_first_untouched() {
    let shop = Shop::new();
    shop.add("ann", "X", 2).unwrap();
    shop.add("ann", "Y", 4).unwrap();
    shop.add("bob", "Y", 3).unwrap();
    shop.place("bob").unwrap();

    let err = shop.place("ann").unwrap_err();
    assert!(matches!(
        err,
        FulfillmentError::InsufficientStock {
            requested: 4,
            available: 2,
            ..
        }
    ));
    assert_eq!(shop.stock("X"), 10);
    assert_eq!(shop.stock("Y"), 2);
    assert_eq!(shop.store.order_count(), 1);
    assert!(shop
        .store
        .adjustments(&StoreId::new(STORE), &Sku::new("X"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_decrement_shortfall_releases_earlier_lines() {
    let shop = shop_with(|store, repos| repos.catalog = Arc::new(StaleCatalog(store.clone())));
    shop.add("ann", "X", 2).unwrap();
    shop.add("ann", "Y", 9).unwrap();

    let err = shop.place("ann").unwrap_err();
    assert!(matches!(
        err,
        FulfillmentError::InsufficientStock {
            requested: 9,
            available: 5,
            ..
        }
    ));

    assert_eq!(shop.stock("X"), 10);
    assert_eq!(shop.stock("Y"), 5);
    assert_eq!(shop.store.order_count(), 0);
    assert_eq!(shop.cart_quantity("ann", "X"), Some(2));
    assert_eq!(shop.cart_quantity("ann", "Y"), Some(9));

    let x_ledger: Vec<_> = shop
        .store
        .adjustments(&StoreId::new(STORE), &Sku::new("X"))
        .unwrap()
        .into_iter()
        .map(|a| a.reason)
        .collect();
    assert_eq!(x_ledger, vec![AdjustmentReason::Sale, AdjustmentReason::Release]);
    assert!(shop
        .store
        .adjustments(&StoreId::new(STORE), &Sku::new("Y"))
        .unwrap()
        .is_empty());
}
