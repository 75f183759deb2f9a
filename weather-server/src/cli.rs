use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tw_weather_core::{Config, WeatherService, location::CANONICAL_LOCATIONS};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tw-weather", version, about = "Taiwan 36-hour forecast proxy")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP proxy.
    Serve {
        /// Port to listen on; overrides PORT and the config file.
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the forecast for a county/city as JSON.
    Show {
        /// Location name, e.g. "臺北市", "台北" or "taipei".
        city: String,
    },

    /// List supported locations.
    Locations,

    /// Store the CWA API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Serve { port, bind } => {
                let mut config = load_effective(&path)?;
                if let Some(port) = port {
                    config.port = port;
                }
                if let Some(bind) = bind {
                    config.bind = bind;
                }
                server::serve(config).await
            }
            Command::Show { city } => {
                let config = load_effective(&path)?;
                let service = WeatherService::from_config(&config)?;
                let outcome = service.forecast(&city).await?;
                println!("{}", serde_json::to_string_pretty(&outcome.forecast)?);
                Ok(())
            }
            Command::Locations => {
                for name in CANONICAL_LOCATIONS {
                    println!("{name}");
                }
                Ok(())
            }
            Command::Configure => configure(&path),
        }
    }
}

/// File config with environment overrides applied.
fn load_effective(path: &std::path::Path) -> anyhow::Result<Config> {
    let mut config = Config::load_from(path)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn configure(path: &std::path::Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;

    let api_key = inquire::Password::new("CWA API key:")
        .without_confirmation()
        .with_help_message("Get one at https://opendata.cwa.gov.tw/user/authkey")
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
