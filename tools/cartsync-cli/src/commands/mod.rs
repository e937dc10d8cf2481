//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod session;

use clap::{Args, Subcommand};

/// Identifies a cart line by product and product type.
#[derive(Args)]
pub struct KeyArgs {
    /// Product id.
    pub product_id: i32,

    /// Product type id.
    pub product_type_id: i32,
}

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Quantity to add.
    #[arg(short, long, default_value_t = 1)]
    pub quantity: i32,
}

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// New quantity for the line.
    pub quantity: i32,
}

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Bearer token issued by the storefront.
    pub token: String,

    /// Keep the guest cart on this device after uploading it.
    #[arg(long)]
    pub keep_local: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Write a default cartsync.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
