//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use turbo_fulfillment::prelude::*;

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Shop-level settings.
    #[serde(default)]
    pub shop: ShopConfig,

    /// Engine settings.
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,

    /// Stores and their shipping rates.
    #[serde(default)]
    pub stores: Vec<StoreConfig>,

    /// Catalog seed data.
    #[serde(default)]
    pub products: Vec<ProductConfig>,

    /// Customer addresses.
    #[serde(default)]
    pub addresses: Vec<AddressConfig>,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Build a fresh store holding the seed data.
    pub fn seed_store(&self) -> MemoryStore {
        let store = MemoryStore::new();
        let currency = self.fulfillment.currency;
        let money = |v: f64| Money::from_decimal(v, currency);

        for cfg in &self.stores {
            store.put_store(StoreSettings {
                id: StoreId::new(&cfg.id),
                name: cfg.name.clone(),
                alert_email: cfg.alert_email.clone(),
            });
            for rate in &cfg.shipping {
                store.put_shipping_rate(ShippingRate::new(
                    StoreId::new(&cfg.id),
                    &rate.region,
                    money(rate.cost),
                ));
            }
        }

        for cfg in &self.products {
            let product = Product::new(
                ProductId::new(&cfg.id),
                StoreId::new(&cfg.store),
                &cfg.name,
            )
            .with_discount(cfg.discount.into_policy(&cfg.id, currency))
            .with_min_stock_threshold(cfg.min_stock_threshold);

            for v in &cfg.variants {
                let mut variant = Variant::new(
                    Sku::new(&v.sku),
                    &product,
                    v.stock,
                    money(v.price),
                    money(v.cost),
                );
                variant.name = v.name.clone();
                store.put_variant(variant);
            }
            debug!(product = %product.id, variants = cfg.variants.len(), "seeded product");
            store.put_product(product);
        }

        for cfg in &self.addresses {
            let mut address = Address::new(
                AddressId::new(&cfg.id),
                CustomerId::new(&cfg.customer),
                &cfg.region,
            );
            address.recipient = cfg.recipient.clone();
            address.line1 = cfg.line1.clone();
            address.city = cfg.city.clone();
            address.postal_code = cfg.postal_code.clone();
            store.put_address(address);
        }

        store
    }
}

/// Shop-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Display name.
    #[serde(default = "default_shop_name")]
    pub name: String,

    /// Where carts, orders and stock levels are kept between runs,
    /// relative to the config file.
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

fn default_shop_name() -> String {
    "TurboCommerce".to_string()
}

fn default_state_file() -> String {
    ".turbo/state.json".to_string()
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            name: default_shop_name(),
            state_file: default_state_file(),
        }
    }
}

/// A store and where it ships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Low-stock alert recipient.
    #[serde(default)]
    pub alert_email: Option<String>,
    #[serde(default)]
    pub shipping: Vec<ShippingConfig>,
}

/// Flat shipping cost for a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingConfig {
    pub region: String,
    /// Decimal amount in the shop currency.
    pub cost: f64,
}

/// A product with its variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub id: String,
    pub store: String,
    pub name: String,
    #[serde(default)]
    pub min_stock_threshold: i64,
    /// Raw discount record, validated when the store is seeded.
    #[serde(default)]
    pub discount: RawDiscount,
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
}

/// A purchasable variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub stock: i64,
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
}

/// A customer delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressConfig {
    pub id: String,
    pub customer: String,
    pub region: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Generate a default turbo.toml config file.
pub fn generate_default_config(name: &str) -> String {
    format!(
        r#"# TurboCommerce fulfillment configuration

[shop]
name = "{name}"
state_file = ".turbo/state.json"

[fulfillment]
currency = "USD"
max_quantity_per_line = 9999

[fulfillment.low_stock]
enabled = true
cooldown_secs = 3600

[[stores]]
id = "main"
name = "{name}"
alert_email = "ops@example.com"

[[stores.shipping]]
region = "Java"
cost = 5.0

[[stores.shipping]]
region = "Bali"
cost = 8.5

[[products]]
id = "tee"
store = "main"
name = "Classic Tee"
min_stock_threshold = 3

[products.discount]
kind = "amount"
value = 25.0
min_purchase = 50.0

[[products.variants]]
sku = "TEE-M"
name = "Medium"
stock = 10
price = 100.0
cost = 30.0

[[products.variants]]
sku = "TEE-S"
name = "Small"
stock = 5
price = 40.0
cost = 15.0

[[addresses]]
id = "home"
customer = "ann"
recipient = "Ann"
line1 = "Jl. Braga 1"
city = "Bandung"
region = "Java"
"#,
        name = name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_and_seeds() {
        let config: CliConfig = toml::from_str(&generate_default_config("Demo")).unwrap();
        assert_eq!(config.shop.name, "Demo");
        assert_eq!(config.fulfillment.low_stock.cooldown_secs, 3600);

        let store = config.seed_store();
        let tee = store.product(&ProductId::new("tee")).unwrap();
        assert!(matches!(tee.discount, DiscountPolicy::Amount { .. }));
        let variant = store.variant(&StoreId::new("main"), &Sku::new("TEE-M")).unwrap();
        assert_eq!(variant.unit_price, Money::new(10000, Currency::USD));
        assert_eq!(tee.unit_price(&variant), Money::new(7500, Currency::USD));
        assert_eq!(
            store
                .find_shipping_cost(&StoreId::new("main"), "bali")
                .unwrap(),
            Some(Money::new(850, Currency::USD))
        );
    }

    #[test]
    fn test_unknown_discount_kind_seeds_as_none() {
        let config: CliConfig = toml::from_str(
            r#"
            [[products]]
            id = "mug"
            store = "main"
            name = "Mug"
            discount = { kind = "bogo", value = 1.0 }
            "#,
        )
        .unwrap();
        let store = config.seed_store();
        assert!(store.product(&ProductId::new("mug")).unwrap().discount.is_none());
    }
}
