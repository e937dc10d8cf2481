//! cartsync - command line client for a storefront shopping cart.
//!
//! Commands:
//! - `cartsync add` - Add a product to the cart
//! - `cartsync list` - Show cart contents with prices
//! - `cartsync remove` - Remove a product
//! - `cartsync update` - Change a line's quantity
//! - `cartsync count` - Show the item count
//! - `cartsync login` / `logout` - Switch between guest and account carts
//! - `cartsync config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use cartsync_store::StoreError;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AddArgs, ConfigArgs, KeyArgs, LoginArgs, UpdateArgs};

/// cartsync - Manage a storefront cart as a guest or signed-in shopper
#[derive(Parser)]
#[command(name = "cartsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a product to the cart
    Add(AddArgs),

    /// List cart products
    List,

    /// Remove a product from the cart
    Remove(KeyArgs),

    /// Set the quantity of a cart line
    Update(UpdateArgs),

    /// Show the number of items in the cart
    Count,

    /// Sign in and upload the guest cart
    Login(LoginArgs),

    /// Sign out
    Logout,

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Add(args) => commands::cart::add(args, &ctx).await,
        Commands::List => commands::cart::list(&ctx).await,
        Commands::Remove(args) => commands::cart::remove(args, &ctx).await,
        Commands::Update(args) => commands::cart::update(args, &ctx).await,
        Commands::Count => commands::cart::count(&ctx).await,
        Commands::Login(args) => commands::session::login(args, &ctx).await,
        Commands::Logout => commands::session::logout(&ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        if e.downcast_ref::<StoreError>().is_some_and(StoreError::is_remote) {
            ctx.output.warn(&format!(
                "Check that the storefront API is reachable at {}",
                ctx.config.server.base_url
            ));
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
