//! Create a turbo.toml and reset saved state.

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;

use super::{InitArgs, ResetArgs};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the init command.
pub fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    let path = ctx.root.join("turbo.toml");
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(&path, generate_default_config(&args.name))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "config": path.display().to_string() }));
        return Ok(());
    }
    ctx.output.success(&format!("Created {}", path.display()));
    ctx.output.info("Edit the [[products]] and [[stores]] sections, then run `turbo cart add`.");
    Ok(())
}

/// Run the reset command: forget carts, orders and stock changes.
pub fn reset(args: ResetArgs, ctx: &Context) -> Result<()> {
    let path = ctx.state_path();
    if !path.exists() {
        ctx.output.info("Nothing to reset.");
        return Ok(());
    }

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {}?", path.display()))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Reset cancelled");
            return Ok(());
        }
    }

    let _lock = ctx.lock_state()?;
    std::fs::remove_file(&path)
        .with_context(|| format!("Failed to remove {}", path.display()))?;
    ctx.output.success("State reset; the next command reseeds from config");
    Ok(())
}
