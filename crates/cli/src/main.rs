//! swift - OpenStack Swift CLI Client
//!
//! A command-line interface for retrieving, storing, listing and removing
//! objects in an OpenStack Swift object store.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use swift_cli::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --debug
    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
