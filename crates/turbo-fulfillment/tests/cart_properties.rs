//! The cached cart total always equals a fresh recomputation.

mod common;

use common::Shop;
use proptest::prelude::*;
use turbo_fulfillment::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(&'static str, i64),
    Update(usize, i64),
    Remove(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    let sku = prop::sample::select(vec!["X", "Y", "MUG"]);
    prop_oneof![
        4 => (sku, -1i64..8).prop_map(|(s, q)| Op::Add(s, q)),
        3 => (0usize..3, -1i64..12).prop_map(|(i, q)| Op::Update(i, q)),
        1 => (0usize..3).prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

fn fresh_total(shop: &Shop, cart: &Cart) -> Money {
    let mut total = Money::zero(Currency::USD);
    for line in &cart.lines {
        let variant = shop.store.variant(&cart.store_id, &line.sku).unwrap();
        let product = shop.store.product(&variant.product_id).unwrap();
        total = total
            .checked_add(&product.unit_price(&variant).checked_multiply(line.quantity).unwrap())
            .unwrap();
    }
    total
}

proptest! {
    #[test]
    fn prop_total_matches_recomputation(ops in prop::collection::vec(op(), 1..25)) {
        let shop = Shop::new();
        let shopper = shop.shopper("ann");

        for op in ops {
            let lines = shop.engine.get_totals(&shopper).unwrap().lines;
            let line_id = |i: usize| lines.get(i).map(|l| l.line_id.clone())
                .unwrap_or_else(|| CartLineId::new("missing"));

            let _ = match op {
                Op::Add(sku, q) => shop.add("ann", sku, q),
                Op::Update(i, q) => shop.engine.update_line_quantity(&shopper, &line_id(i), q),
                Op::Remove(i) => shop.engine.remove_line(&shopper, &line_id(i)),
                Op::Clear => shop.engine.clear_cart(&shopper),
            };

            if let Some(cart) = shop.store.load_cart(&CustomerId::new("ann")) {
                prop_assert_eq!(cart.total_price, fresh_total(&shop, &cart));
                for line in &cart.lines {
                    prop_assert!(line.quantity > 0);
                    prop_assert!(line.quantity <= shop.stock(line.sku.as_str()));
                }
                let skus: std::collections::HashSet<_> = cart.lines.iter().map(|l| &l.sku).collect();
                prop_assert_eq!(skus.len(), cart.lines.len());
            }
        }
    }
}
