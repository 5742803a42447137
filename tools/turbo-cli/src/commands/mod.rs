//! CLI command implementations.

pub mod cart;
pub mod init;
pub mod order;
pub mod stock;

use clap::{Args, Subcommand};

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Shop name.
    #[arg(default_value = "My Shop")]
    pub name: String,

    /// Overwrite an existing turbo.toml.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the reset command.
#[derive(Args)]
pub struct ResetArgs {
    /// Skip confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Which customer and store a command runs for.
#[derive(Args, Clone)]
pub struct ShopperArgs {
    /// Customer ID.
    #[arg(short = 'u', long, env = "TURBO_CUSTOMER")]
    pub customer: String,

    /// Store ID (default: first configured store).
    #[arg(short, long)]
    pub store: Option<String>,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(flatten)]
    pub shopper: ShopperArgs,

    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show lines and totals.
    Show,
    /// Add units of a variant.
    Add {
        /// Product ID.
        product: String,
        /// Variant SKU.
        sku: String,
        /// Quantity to add.
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Set a line's quantity (zero or less removes it).
    Update {
        /// Cart line ID.
        line: String,
        /// New quantity.
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line.
    Remove {
        /// Cart line ID.
        line: String,
    },
    /// Remove every line.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the order command.
#[derive(Args)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

#[derive(Subcommand)]
pub enum OrderCommand {
    /// Turn the cart into an order.
    Place {
        #[command(flatten)]
        shopper: ShopperArgs,
        /// Delivery address ID.
        #[arg(short, long)]
        address: String,
    },
    /// Show one order.
    Show {
        /// Order ID.
        order: String,
    },
    /// List a customer's orders.
    List {
        /// Customer ID.
        #[arg(short = 'u', long, env = "TURBO_CUSTOMER")]
        customer: String,
    },
    /// Move an order to a new status (shipped, delivered, cancelled).
    Status {
        /// Order ID.
        order: String,
        /// Target status.
        status: String,
    },
    /// Cancel a pending order.
    Cancel {
        /// Order ID.
        order: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the stock command.
#[derive(Args)]
pub struct StockArgs {
    /// Store ID (default: first configured store).
    #[arg(short, long)]
    pub store: Option<String>,

    /// Show the adjustment ledger for one SKU.
    #[arg(long)]
    pub sku: Option<String>,
}
