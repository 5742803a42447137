//! Threshold and cooldown gated low-stock alerts.

use super::Notifier;
use crate::catalog::{Product, Variant};
use crate::config::LowStockConfig;
use crate::repository::RecipientDirectory;
use std::sync::Arc;
use tracing::{debug, info, warn};
use turbo_cache::{cache_key, Cache, Clock, SystemClock};

/// What [`LowStockMonitor::notify_if_low`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Alerts are switched off.
    Disabled,
    /// Stock is above the threshold.
    NotLow,
    /// The store has nobody to alert.
    NoRecipient,
    /// The recipient lookup failed.
    RecipientLookupFailed,
    /// An alert for this product went out within the cooldown window.
    Suppressed,
    /// Alert delivered.
    Sent { recipient: String },
    /// Delivery failed; the next trigger will try again.
    DeliveryFailed,
}

/// Sends at most one low-stock alert per product per cooldown window.
///
/// The window lives in an injectable TTL cache keyed by product, so tests
/// can drive it with a manual clock. Nothing this type does can fail its
/// caller.
pub struct LowStockMonitor {
    recipients: Arc<dyn RecipientDirectory>,
    notifier: Arc<dyn Notifier>,
    cooldown: Cache<i64>,
    enabled: bool,
}

impl LowStockMonitor {
    pub fn new(
        recipients: Arc<dyn RecipientDirectory>,
        notifier: Arc<dyn Notifier>,
        config: &LowStockConfig,
    ) -> Self {
        Self::with_clock(recipients, notifier, config, Arc::new(SystemClock))
    }

    /// Use `clock` to measure the cooldown window.
    pub fn with_clock(
        recipients: Arc<dyn RecipientDirectory>,
        notifier: Arc<dyn Notifier>,
        config: &LowStockConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            recipients,
            notifier,
            cooldown: Cache::with_clock(config.cooldown(), clock),
            enabled: config.enabled,
        }
    }

    /// Alert the store if `variant` is at or below `product`'s threshold.
    pub fn notify_if_low(&self, product: &Product, variant: &Variant) -> MonitorOutcome {
        if !self.enabled {
            return MonitorOutcome::Disabled;
        }
        if !product.is_low_stock(variant) {
            return MonitorOutcome::NotLow;
        }

        let recipient = match self.recipients.alert_recipient(&product.store_id) {
            Ok(Some(recipient)) => recipient,
            Ok(None) => {
                debug!(store = %product.store_id, "no alert recipient configured");
                return MonitorOutcome::NoRecipient;
            }
            Err(e) => {
                warn!(store = %product.store_id, error = %e, "alert recipient lookup failed");
                return MonitorOutcome::RecipientLookupFailed;
            }
        };

        // Claim the window before sending so concurrent triggers send once.
        let key = cache_key!("low-stock", product.id);
        if !self.cooldown.insert_if_absent(&key, variant.stock) {
            debug!(
                product = %product.id,
                alerted_at = ?self.cooldown.get(&key),
                "low-stock alert suppressed by cooldown"
            );
            return MonitorOutcome::Suppressed;
        }

        let subject = format!("Low stock: {}", product.name);
        let body = format!(
            "Product {} ({}) variant {} has {} unit(s) left (threshold {}).",
            product.name, product.id, variant.sku, variant.stock, product.min_stock_threshold
        );
        match self.notifier.send(&recipient, &subject, &body) {
            Ok(()) => {
                info!(product = %product.id, sku = %variant.sku, stock = variant.stock, %recipient, "low-stock alert sent");
                MonitorOutcome::Sent { recipient }
            }
            Err(e) => {
                self.cooldown.delete(&key);
                warn!(product = %product.id, %recipient, error = %e, "low-stock alert delivery failed");
                MonitorOutcome::DeliveryFailed
            }
        }
    }

    /// Check if an alert for `product` went out within the window.
    pub fn is_cooling_down(&self, product: &Product) -> bool {
        self.cooldown.exists(&cache_key!("low-stock", product.id))
    }

    /// Forget every cooldown.
    pub fn reset(&self) {
        self.cooldown.clear();
    }
}

impl std::fmt::Debug for LowStockMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LowStockMonitor")
            .field("enabled", &self.enabled)
            .field("cooldown_ttl", &self.cooldown.ttl())
            .field("cooling_down", &self.cooldown.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{NotifyError, RecordingNotifier};
    use crate::ids::{ProductId, Sku, StoreId};
    use crate::money::{Currency, Money};
    use crate::storage::{MemoryStore, StoreSettings};
    use std::time::Duration;
    use turbo_cache::ManualClock;

    struct Fixture {
        monitor: LowStockMonitor,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<ManualClock>,
        product: Product,
        variant: Variant,
    }

    fn fixture(recipient: Option<&str>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        store.put_store(StoreSettings {
            id: StoreId::new("s1"),
            name: "Shop".into(),
            alert_email: recipient.map(str::to_string),
        });
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(ManualClock::new());
        let monitor = LowStockMonitor::with_clock(
            store,
            notifier.clone(),
            &LowStockConfig::default(),
            clock.clone(),
        );
        let product = Product::new(ProductId::new("p1"), StoreId::new("s1"), "Mug")
            .with_min_stock_threshold(3);
        let usd = |c| Money::new(c, Currency::USD);
        let variant = Variant::new(Sku::new("MUG"), &product, 2, usd(1200), usd(300));
        Fixture {
            monitor,
            notifier,
            clock,
            product,
            variant,
        }
    }

    #[test]
    fn test_not_low_is_noop() {
        let f = fixture(Some("ops@shop.test"));
        let mut variant = f.variant.clone();
        variant.stock = 4;
        assert_eq!(f.monitor.notify_if_low(&f.product, &variant), MonitorOutcome::NotLow);
        assert_eq!(f.notifier.count(), 0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let f = fixture(Some("ops@shop.test"));
        let mut variant = f.variant.clone();
        variant.stock = 3;
        assert!(matches!(
            f.monitor.notify_if_low(&f.product, &variant),
            MonitorOutcome::Sent { .. }
        ));
    }

    #[test]
    fn test_no_recipient_is_noop() {
        let f = fixture(None);
        assert_eq!(
            f.monitor.notify_if_low(&f.product, &f.variant),
            MonitorOutcome::NoRecipient
        );
        assert!(!f.monitor.is_cooling_down(&f.product));
    }

    #[test]
    fn test_cooldown_suppresses_then_expires() {
        let f = fixture(Some("ops@shop.test"));
        assert_eq!(
            f.monitor.notify_if_low(&f.product, &f.variant),
            MonitorOutcome::Sent {
                recipient: "ops@shop.test".into()
            }
        );
        f.clock.advance(Duration::from_secs(1800));
        assert_eq!(
            f.monitor.notify_if_low(&f.product, &f.variant),
            MonitorOutcome::Suppressed
        );

        f.clock.advance(Duration::from_secs(1801));
        assert!(matches!(
            f.monitor.notify_if_low(&f.product, &f.variant),
            MonitorOutcome::Sent { .. }
        ));
        assert_eq!(f.notifier.count(), 2);
        let body = &f.notifier.sent()[0].body;
        assert!(body.contains("p1") && body.contains("2 unit(s)"));
    }

    #[test]
    fn test_delivery_failure_releases_cooldown() {
        let f = fixture(Some("ops@shop.test"));
        f.notifier.fail_with(NotifyError::Unavailable("smtp down".into()));
        assert_eq!(
            f.monitor.notify_if_low(&f.product, &f.variant),
            MonitorOutcome::DeliveryFailed
        );
        assert!(!f.monitor.is_cooling_down(&f.product));

        f.notifier.recover();
        assert!(matches!(
            f.monitor.notify_if_low(&f.product, &f.variant),
            MonitorOutcome::Sent { .. }
        ));
    }

    #[test]
    fn test_disabled_monitor() {
        let store = Arc::new(MemoryStore::new());
        let config = LowStockConfig {
            enabled: false,
            ..LowStockConfig::default()
        };
        let monitor = LowStockMonitor::new(store, Arc::new(RecordingNotifier::new()), &config);
        let f = fixture(Some("ops@shop.test"));
        assert_eq!(monitor.notify_if_low(&f.product, &f.variant), MonitorOutcome::Disabled);
    }
}
