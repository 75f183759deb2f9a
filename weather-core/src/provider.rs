use crate::{Config, WeatherError, model::CwaLocation, provider::cwa::CwaProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod cwa;

/// A location record as returned upstream, plus the dataset label it came with.
#[derive(Debug, Clone)]
pub struct UpstreamForecast {
    pub dataset_description: String,
    pub location: CwaLocation,
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Fetch the raw 36-hour forecast record for a canonical location name.
    async fn fetch(&self, location: &str) -> Result<UpstreamForecast, WeatherError>;
}

/// Construct the CWA provider from config.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn ForecastProvider>, WeatherError> {
    let api_key = config.api_key().ok_or(WeatherError::MissingApiKey)?;

    let provider = CwaProvider::new(
        api_key.to_owned(),
        config.upstream_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;

    Ok(Arc::new(provider))
}
