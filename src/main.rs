//! Cart Discounts CLI
//!
//! Runs one fee calculation pass over a cart fixture with a discount policy and prints the
//! resulting receipt.
//!
//! Use `--policy` to load a policy file and `--cart` to load a cart fixture.
//! Use `--mode` to override how the bulk rule picks the cheapest unit.
//! Use `--admin` and `--ajax` to simulate requests from an administrative screen.

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cart_discounts::{
    config::{CartFixture, PolicyConfig},
    discounts::BulkMode,
    hooks::{CartDiscounts, HookRegistry, RequestContext},
    receipt::Receipt,
};

/// Arguments for the cart discounts CLI
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Discount policy file
    #[arg(short, long)]
    policy: PathBuf,

    /// Cart fixture file
    #[arg(short, long)]
    cart: PathBuf,

    /// Override the bulk rule's cheapest unit selection
    #[arg(short, long, value_enum)]
    mode: Option<BulkMode>,

    /// Treat the request as coming from an administrative screen
    #[arg(long)]
    admin: bool,

    /// Treat the request as an asynchronous in-page update
    #[arg(long)]
    ajax: bool,

    /// Log filter directives, written to stderr
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

fn init_subscriber(log_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_new(log_level)?)
        .try_init()?;

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_subscriber(&args.log_level)?;

    let mut policy = PolicyConfig::load(&args.policy)?;

    if let Some(mode) = args.mode {
        policy = policy.with_bulk_mode(mode);
    }

    let loaded = CartFixture::load(&args.cart)?;

    info!(
        policy = %args.policy.display(),
        cart = %args.cart.display(),
        lines = loaded.cart.len(),
        "loaded cart"
    );

    let mut registry = HookRegistry::new();
    CartDiscounts::new(policy, loaded.catalog.clone()).register(&mut registry);

    let request = RequestContext::new(args.admin, args.ajax);
    let fees = registry.calculate_fees(&request, &loaded.cart)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::new(&loaded.cart, &fees)?.write_to(&mut handle, &loaded.cart, &loaded.catalog)?;

    Ok(())
}
