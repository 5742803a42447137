//! Engine configuration.

use crate::cart::MAX_QUANTITY_PER_LINE;
use crate::money::Currency;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the cart store and fulfillment engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FulfillmentConfig {
    /// Currency carts are priced in.
    #[serde(default)]
    pub currency: Currency,

    /// Largest quantity a single cart line may hold.
    #[serde(default = "default_max_quantity")]
    pub max_quantity_per_line: i64,

    /// Low-stock alerting.
    #[serde(default)]
    pub low_stock: LowStockConfig,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            max_quantity_per_line: default_max_quantity(),
            low_stock: LowStockConfig::default(),
        }
    }
}

fn default_max_quantity() -> i64 {
    MAX_QUANTITY_PER_LINE
}

/// Low-stock alert settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockConfig {
    /// Send alerts at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum seconds between two alerts for the same product.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl LowStockConfig {
    /// Cooldown window as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for LowStockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cooldown_secs() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: FulfillmentConfig =
            serde_json::from_str(r#"{"currency":"EUR","low_stock":{"cooldown_secs":60}}"#).unwrap();
        assert_eq!(config.currency, Currency::EUR);
        assert_eq!(config.max_quantity_per_line, MAX_QUANTITY_PER_LINE);
        assert!(config.low_stock.enabled);
        assert_eq!(config.low_stock.cooldown(), Duration::from_secs(60));
    }
}
