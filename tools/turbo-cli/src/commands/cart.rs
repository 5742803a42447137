//! Cart commands.

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use turbo_fulfillment::prelude::*;

use super::{CartArgs, CartCommand, ShopperArgs};
use crate::context::Context;

/// Run the cart command.
pub fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let shopper = shopper(&args.shopper, ctx)?;
    let command = args.command.unwrap_or(CartCommand::Show);
    if let CartCommand::Clear { yes: false } = command {
        if !ctx.output.is_json() && !confirm_clear(&shopper)? {
            ctx.output.warn("Cart left as is");
            return Ok(());
        }
    }

    let state = ctx.open_store()?;
    let engine = ctx.engine(&state.store);

    let totals = match command {
        CartCommand::Show => engine.get_totals(&shopper)?,
        CartCommand::Add {
            product,
            sku,
            quantity,
        } => {
            let totals = engine.add_line(
                &shopper,
                &ProductId::new(product),
                &Sku::new(&sku),
                quantity,
            )?;
            ctx.output.success(&format!("Added {} x {}", quantity, sku));
            totals
        }
        CartCommand::Update { line, quantity } => {
            let totals =
                engine.update_line_quantity(&shopper, &CartLineId::new(&line), quantity)?;
            if quantity <= 0 {
                ctx.output.success(&format!("Removed line {}", line));
            } else {
                ctx.output.success(&format!("Line {} now holds {}", line, quantity));
            }
            totals
        }
        CartCommand::Remove { line } => {
            let totals = engine.remove_line(&shopper, &CartLineId::new(&line))?;
            ctx.output.success(&format!("Removed line {}", line));
            totals
        }
        CartCommand::Clear { .. } => {
            let totals = engine.clear_cart(&shopper)?;
            ctx.output.success("Cart cleared");
            totals
        }
    };

    state.save()?;
    print_totals(&totals, ctx);
    Ok(())
}

fn confirm_clear(shopper: &Shopper) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("Empty the cart of {}?", shopper.customer_id))
        .default(false)
        .interact()?)
}

/// Resolve the customer/store pair a command runs for.
pub fn shopper(args: &ShopperArgs, ctx: &Context) -> Result<Shopper> {
    let store = args
        .store
        .as_deref()
        .or_else(|| ctx.default_store())
        .context("No store given and none configured (pass --store)")?;
    Ok(Shopper::new(args.customer.as_str(), store))
}

fn print_totals(totals: &CartTotals, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(totals);
        return;
    }

    ctx.output.header(&format!("Cart for {}", totals.customer_id));
    if totals.is_empty() {
        ctx.output.info("Cart is empty.");
        return;
    }

    let widths = [24, 12, 5, 12, 12];
    ctx.output
        .table_row(&["LINE", "SKU", "QTY", "UNIT", "TOTAL"], &widths);
    for line in &totals.lines {
        let unit = if line.unit_price == line.list_unit_price {
            line.unit_price.display()
        } else {
            format!("{} ({})", line.unit_price.display(), line.list_unit_price.display())
        };
        ctx.output.table_row(
            &[
                line.line_id.as_str(),
                line.sku.as_str(),
                &line.quantity.to_string(),
                &unit,
                &line.line_total.display(),
            ],
            &widths,
        );
        if !line.is_in_stock() {
            ctx.output
                .warn(&format!("{}: only {} left in stock", line.sku, line.available));
        }
    }

    println!();
    ctx.output.kv("Items", &totals.item_count().to_string());
    if totals.savings().is_positive() {
        ctx.output.kv("Savings", &totals.savings().display());
    }
    ctx.output.kv("Total", &totals.total_price.display());
}
