//! turboctl - CLI for Turbonomic placement reservations.
//!
//! Reserves capacity for workloads described by templates, waits for the
//! market's placement decision, and queries the catalog objects a
//! reservation refers to.

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod error;
mod logging;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run().await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
