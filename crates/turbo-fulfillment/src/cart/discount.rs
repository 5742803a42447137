//! Discount engine.
//!
//! A product carries one [`DiscountPolicy`]; [`DiscountPolicy::apply`] turns
//! a variant's listed unit price into the price the shopper pays. Pricing is
//! pure and never goes below zero.

use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a product's listed price is reduced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountPolicy {
    /// Listed price applies.
    #[default]
    None,
    /// Percentage off, optionally capped at an absolute amount.
    Percentage {
        percent: f64,
        #[serde(default)]
        cap: Option<Money>,
    },
    /// Fixed amount off when the price reaches `min_purchase`, optionally
    /// capped.
    Amount {
        value: Money,
        #[serde(default)]
        min_purchase: Option<Money>,
        #[serde(default)]
        max_cap: Option<Money>,
    },
    /// Fixed amount off when the price reaches `min_purchase`.
    Fixed {
        value: Money,
        #[serde(default)]
        min_purchase: Option<Money>,
    },
}

impl DiscountPolicy {
    /// Amount taken off `base`. Always within `0..=base`.
    pub fn discount_for(&self, base: Money) -> Money {
        let zero = Money::zero(base.currency);
        if !base.is_positive() {
            return zero;
        }
        if let Some(other) = self.currency().filter(|c| *c != base.currency) {
            warn!(
                expected = %base.currency,
                got = %other,
                "discount currency differs from price currency, ignoring discount"
            );
            return zero;
        }

        let raw = match self {
            DiscountPolicy::None => zero,
            DiscountPolicy::Percentage { percent, cap } => {
                let off = base.percentage(*percent);
                match cap {
                    Some(cap) => off.min(*cap),
                    None => off,
                }
            }
            DiscountPolicy::Amount {
                value,
                min_purchase,
                max_cap,
            } => {
                if below_minimum(base, *min_purchase) {
                    zero
                } else {
                    match max_cap {
                        Some(cap) => value.min(*cap),
                        None => *value,
                    }
                }
            }
            DiscountPolicy::Fixed {
                value,
                min_purchase,
            } => {
                if below_minimum(base, *min_purchase) {
                    zero
                } else {
                    *value
                }
            }
        };

        // Never negative, never more than the price itself.
        Money::new(raw.amount_cents.clamp(0, base.amount_cents), base.currency)
    }

    /// Effective unit price after the discount. Never negative.
    pub fn apply(&self, base: Money) -> Money {
        let off = self.discount_for(base);
        Money::new(base.amount_cents - off.amount_cents, base.currency).floor_zero()
    }

    /// Check if this policy can ever change a price.
    pub fn is_none(&self) -> bool {
        matches!(self, DiscountPolicy::None)
    }

    fn currency(&self) -> Option<Currency> {
        match self {
            DiscountPolicy::None => None,
            DiscountPolicy::Percentage { cap, .. } => cap.map(|c| c.currency),
            DiscountPolicy::Amount { value, .. } | DiscountPolicy::Fixed { value, .. } => {
                Some(value.currency)
            }
        }
    }
}

fn below_minimum(base: Money, min_purchase: Option<Money>) -> bool {
    min_purchase.is_some_and(|min| base.amount_cents < min.amount_cents)
}

/// Loosely-typed discount record as stored by the storefront's admin side:
/// a kind string plus nullable decimal fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawDiscount {
    /// "percentage", "amount", "fixed", "none" or empty.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub cap_amount: Option<f64>,
    #[serde(default)]
    pub min_purchase: Option<f64>,
    #[serde(default)]
    pub max_cap_amount: Option<f64>,
}

impl RawDiscount {
    /// Convert into a [`DiscountPolicy`].
    ///
    /// Unknown kinds and records missing their value are data-integrity
    /// problems, not shopper errors: they log a warning and price at the
    /// listed price.
    pub fn into_policy(&self, product: &str, currency: Currency) -> DiscountPolicy {
        let money = |v: f64| Money::from_decimal(v, currency);
        let kind = self
            .kind
            .as_deref()
            .map(|k| k.trim().to_lowercase())
            .unwrap_or_default();

        if kind.is_empty() || kind == "none" {
            return DiscountPolicy::None;
        }
        let Some(value) = self.value else {
            warn!(product, kind = %kind, "discount has no value, ignoring");
            return DiscountPolicy::None;
        };

        match kind.as_str() {
            "percentage" | "percent" => DiscountPolicy::Percentage {
                percent: value,
                cap: self.cap_amount.map(money),
            },
            "amount" => DiscountPolicy::Amount {
                value: money(value),
                min_purchase: self.min_purchase.map(money),
                max_cap: self.max_cap_amount.map(money),
            },
            "fixed" => DiscountPolicy::Fixed {
                value: money(value),
                min_purchase: self.min_purchase.map(money),
            },
            other => {
                warn!(product, kind = other, "unsupported discount type, ignoring");
                DiscountPolicy::None
            }
        }
    }
}
