//! Order commands.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use turbo_fulfillment::prelude::*;

use super::{OrderArgs, OrderCommand};
use crate::context::Context;
use crate::output::{format_timestamp, status_badge};

/// Run the order command.
pub fn run(args: OrderArgs, ctx: &Context) -> Result<()> {
    if let OrderCommand::Cancel { order, yes: false } = &args.command {
        if !ctx.output.is_json() && !confirm_cancel(order)? {
            ctx.output.warn("Order left as is");
            return Ok(());
        }
    }

    let state = ctx.open_store()?;
    let engine = ctx.engine(&state.store);

    match args.command {
        OrderCommand::Place { shopper, address } => {
            let shopper = super::cart::shopper(&shopper, ctx)?;
            let order = engine.place_order(&shopper, &AddressId::new(address))?;
            state.save()?;
            ctx.output.success(&format!(
                "Placed order {} ({})",
                order.order_number,
                order.grand_total.display()
            ));
            print_order(&order, ctx);
        }
        OrderCommand::Show { order } => {
            let order = engine.get_order(&OrderId::new(order))?;
            print_order(&order, ctx);
        }
        OrderCommand::List { customer } => {
            let orders = engine.list_orders(&CustomerId::new(customer.as_str()))?;
            print_orders(&customer, &orders, ctx);
        }
        OrderCommand::Status { order, status } => {
            let Some(next) = OrderStatus::from_str(&status) else {
                bail!("Unknown status '{}'. Expected: shipped, delivered, cancelled", status);
            };
            let order = engine.update_order_status(&OrderId::new(order), next)?;
            state.save()?;
            ctx.output
                .success(&format!("Order {} is now {}", order.order_number, order.status));
            print_order(&order, ctx);
        }
        OrderCommand::Cancel { order, .. } => {
            let order_id = OrderId::new(order);
            let order = engine.cancel_order(&order_id)?;
            state.save()?;
            ctx.output
                .success(&format!("Cancelled order {}", order.order_number));
            print_order(&order, ctx);
        }
    }

    Ok(())
}

fn confirm_cancel(order: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("Cancel order {}? Stock is not returned.", order))
        .default(false)
        .interact()?)
}

fn print_order(order: &Order, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(order);
        return;
    }

    ctx.output.header(&format!("Order {}", order.order_number));
    ctx.output.kv("ID", order.id.as_str());
    ctx.output.kv("Customer", order.customer_id.as_str());
    ctx.output.kv("Status", &status_badge(order.status.as_str()));
    ctx.output.kv("Placed", &format_timestamp(order.created_at));
    if let Some(at) = order.cancelled_at {
        ctx.output.kv("Cancelled", &format_timestamp(at));
    }
    ctx.output.kv(
        "Ship to",
        &format!("{} ({})", order.shipment.destination, order.shipment.region),
    );

    println!();
    let widths = [12, 24, 5, 12, 12];
    ctx.output
        .table_row(&["SKU", "PRODUCT", "QTY", "UNIT", "TOTAL"], &widths);
    for line in &order.lines {
        ctx.output.table_row(
            &[
                line.sku.as_str(),
                &line.product_name,
                &line.quantity.to_string(),
                &line.unit_price.display(),
                &line.total_price.display(),
            ],
            &widths,
        );
    }

    println!();
    ctx.output.kv("Subtotal", &order.subtotal.display());
    ctx.output.kv("Shipping", &order.shipping_total.display());
    ctx.output.kv("Total", &order.grand_total.display());
}

fn print_orders(customer: &str, orders: &[Order], ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return;
    }

    ctx.output.header(&format!("Orders for {}", customer));
    if orders.is_empty() {
        ctx.output.info("No orders yet.");
        return;
    }

    let widths = [22, 24, 10, 12, 24];
    ctx.output
        .table_row(&["NUMBER", "ID", "STATUS", "TOTAL", "PLACED"], &widths);
    for order in orders {
        ctx.output.table_row(
            &[
                &order.order_number,
                order.id.as_str(),
                order.status.as_str(),
                &order.grand_total.display(),
                &format_timestamp(order.created_at),
            ],
            &widths,
        );
    }
}
