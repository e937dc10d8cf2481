//! Config command implementation.

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommands};
use crate::config::generate_default_config;
use crate::context::Context;

pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show(ctx),
        ConfigCommands::Init { force } => init(force, ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Configuration");
    let source = ctx
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());
    ctx.output.kv("Source", &source);
    ctx.output.kv("Base URL", &ctx.config.server.base_url);
    ctx.output
        .kv("Timeout", &format!("{}ms", ctx.config.server.timeout_ms));
    ctx.output
        .kv("Storage", &ctx.storage_path().display().to_string());
    Ok(())
}

fn init(force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.cwd.join("cartsync.toml");
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(&path, generate_default_config())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    ctx.output
        .success(&format!("Created {}", path.display()));
    Ok(())
}
