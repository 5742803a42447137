//! Turbo CLI - Command line front end for the TurboCommerce fulfillment engine.
//!
//! Commands:
//! - `turbo init` - Write a starter turbo.toml
//! - `turbo cart` - Show and edit a customer's cart
//! - `turbo order` - Place, inspect and move orders
//! - `turbo stock` - Stock levels and adjustment ledger
//! - `turbo reset` - Forget saved state and reseed from config
//!
//! Exit codes: 0 on success, 2 when the request was rejected (bad quantity,
//! not enough stock, illegal status change...), 1 on any other failure.

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use turbo_fulfillment::FulfillmentError;

use commands::{CartArgs, InitArgs, OrderArgs, ResetArgs, StockArgs};

/// Turbo CLI - Carts, orders and stock for a TurboCommerce shop
#[derive(Parser)]
#[command(name = "turbo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// State file path (overrides [shop].state_file)
    #[arg(long, global = true)]
    state: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter turbo.toml
    Init(InitArgs),

    /// Show and edit a customer's cart
    Cart(CartArgs),

    /// Place and manage orders
    Order(OrderArgs),

    /// Show stock levels
    Stock(StockArgs),

    /// Delete saved state
    Reset(ResetArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = output::Output::new(cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), cli.state.as_deref(), output)?;

    let result = match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx),
        Commands::Cart(args) => commands::cart::run(args, &ctx),
        Commands::Order(args) => commands::order::run(args, &ctx),
        Commands::Stock(args) => commands::stock::run(args, &ctx),
        Commands::Reset(args) => commands::init::reset(args, &ctx),
    };

    if let Err(e) = result {
        let (code, exit) = match e.downcast_ref::<FulfillmentError>() {
            Some(err) if err.is_user_facing() => (err.code(), 2),
            Some(err) => (err.code(), 1),
            None => ("internal", 1),
        };
        ctx.output.error(code, &format!("{:#}", e));
        std::process::exit(exit);
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
