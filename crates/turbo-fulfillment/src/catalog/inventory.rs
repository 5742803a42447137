//! Stock ledger types.

use crate::ids::{Sku, StoreId};
use serde::{Deserialize, Serialize};

/// Reason for a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    /// Sold to a customer.
    Sale,
    /// Returned to stock after a failed order placement.
    Release,
}

impl AdjustmentReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentReason::Sale => "sale",
            AdjustmentReason::Release => "release",
        }
    }
}

/// A stock adjustment record (for audit trail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    /// Store the variant belongs to.
    pub store_id: StoreId,
    /// Variant that was adjusted.
    pub sku: Sku,
    /// Change in quantity (negative for sales).
    pub quantity_change: i64,
    /// Stock after the adjustment.
    pub resulting_stock: i64,
    /// Reason for the adjustment.
    pub reason: AdjustmentReason,
    /// Reference ID (e.g., order ID).
    pub reference_id: Option<String>,
    /// Unix timestamp of adjustment.
    pub timestamp: i64,
}

impl StockAdjustment {
    pub fn new(
        store_id: StoreId,
        sku: Sku,
        quantity_change: i64,
        resulting_stock: i64,
        reason: AdjustmentReason,
    ) -> Self {
        Self {
            store_id,
            sku,
            quantity_change,
            resulting_stock,
            reason,
            reference_id: None,
            timestamp: current_timestamp(),
        }
    }

    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_with_reference() {
        let adj = StockAdjustment::new(
            StoreId::new("s1"),
            Sku::new("X"),
            -3,
            7,
            AdjustmentReason::Sale,
        )
        .with_reference("ord_1");
        assert_eq!(adj.reference_id.as_deref(), Some("ord_1"));
        assert_eq!(adj.reason.as_str(), "sale");
        assert!(adj.timestamp > 0);
    }

    #[test]
    fn test_ledger_reasons_match_serialized_names() {
        for reason in [AdjustmentReason::Sale, AdjustmentReason::Release] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
        assert!(serde_json::from_str::<AdjustmentReason>("\"restock\"").is_err());
    }
}
