//! Shopping cart module.
//!
//! Contains the cart aggregate, the discount engine, the pricing projection
//! and the [`CartStore`] service that persists carts per customer.

mod cart;
mod discount;
mod pricing;
mod store;

pub use cart::{Cart, CartLine, QuantityChange, MAX_QUANTITY_PER_LINE};
pub use discount::{DiscountPolicy, RawDiscount};
pub use pricing::{CartLineView, CartTotals};
pub use store::{CartStore, Shopper};
