//! Core library for the Taiwan 36-hour forecast proxy.
//!
//! This crate defines:
//! - Location name normalization against the 22 counties/cities
//! - The CWA upstream client and its payload types
//! - Reshaping upstream records into simplified forecasts
//! - A short-lived in-memory forecast cache
//! - Configuration & the request orchestration shared by the server and CLI
//!
//! It is used by `tw-weather-server`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod forecast;
pub mod location;
pub mod model;
pub mod provider;
pub mod service;

pub use cache::ForecastCache;
pub use config::Config;
pub use error::WeatherError;
pub use model::{ForecastPeriod, LocationForecast};
pub use provider::{ForecastProvider, UpstreamForecast};
pub use service::{ForecastOutcome, WeatherService};
