//! Stock levels and the adjustment ledger.

use anyhow::{Context as _, Result};
use turbo_fulfillment::prelude::*;

use super::StockArgs;
use crate::context::Context;
use crate::output::format_timestamp;

/// Run the stock command.
pub fn run(args: StockArgs, ctx: &Context) -> Result<()> {
    let store_id = args
        .store
        .as_deref()
        .or_else(|| ctx.default_store())
        .map(StoreId::new)
        .context("No store given and none configured (pass --store)")?;
    let state = ctx.open_store()?;
    let store = &state.store;

    match args.sku {
        Some(sku) => ledger(store, &store_id, &Sku::new(sku), ctx),
        None => levels(store, &store_id, ctx),
    }
}

fn levels(store: &MemoryStore, store_id: &StoreId, ctx: &Context) -> Result<()> {
    let variants = store.variants_in(store_id);
    if ctx.output.is_json() {
        ctx.output.json(&variants);
        return Ok(());
    }

    ctx.output.header(&format!("Stock in {}", store_id));
    let widths = [12, 20, 6, 10, 12, 12];
    ctx.output.table_row(
        &["SKU", "PRODUCT", "STOCK", "ALERT AT", "PRICE", "MARGIN"],
        &widths,
    );
    for variant in &variants {
        let product = store.product(&variant.product_id);
        let name = product.as_ref().map_or("?", |p| p.name.as_str());
        let threshold = product
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.min_stock_threshold.to_string());
        let margin = variant
            .unit_margin()
            .map_or_else(|| "-".to_string(), |m| m.display());
        ctx.output.table_row(
            &[
                variant.sku.as_str(),
                name,
                &variant.stock.to_string(),
                &threshold,
                &variant.unit_price.display(),
                &margin,
            ],
            &widths,
        );
        if variant.is_out_of_stock() {
            ctx.output.warn(&format!("{} is out of stock", variant.sku));
        } else if product.is_some_and(|p| p.is_low_stock(variant)) {
            ctx.output.warn(&format!("{} is low on stock", variant.sku));
        }
    }
    Ok(())
}

fn ledger(store: &MemoryStore, store_id: &StoreId, sku: &Sku, ctx: &Context) -> Result<()> {
    let entries = store.adjustments(store_id, sku)?;
    if ctx.output.is_json() {
        ctx.output.json(&entries);
        return Ok(());
    }

    ctx.output.header(&format!("Ledger for {}", sku));
    if entries.is_empty() {
        ctx.output.info("No adjustments recorded.");
        return Ok(());
    }
    let widths = [24, 8, 7, 6, 24];
    ctx.output
        .table_row(&["WHEN", "REASON", "CHANGE", "STOCK", "REFERENCE"], &widths);
    for entry in &entries {
        ctx.output.table_row(
            &[
                &format_timestamp(entry.timestamp),
                entry.reason.as_str(),
                &format!("{:+}", entry.quantity_change),
                &entry.resulting_stock.to_string(),
                entry.reference_id.as_deref().unwrap_or("-"),
            ],
            &widths,
        );
    }
    Ok(())
}
