//! Binary crate for the `tw-weather` proxy.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Serving the REST surface over HTTP
//! - Logging setup

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod response;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "tw_weather_server=info,tw_weather_core=info,tower_http=info".into()
        }))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
