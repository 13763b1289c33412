//! Binary crate for the `weatherly` terminal app.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive navigation between Home, Forecast and Settings
//! - Themed, human-friendly rendering of the view state

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod render;
mod theme;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr and stay quiet by default so they don't tear up the screens.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
