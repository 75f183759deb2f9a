//! Request orchestration: resolve, validate, cache, fetch, reshape.

use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{
    Config, WeatherError,
    cache::ForecastCache,
    forecast,
    location,
    model::LocationForecast,
    provider::{ForecastProvider, provider_from_config},
};

/// A forecast together with whether it was served from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastOutcome {
    pub forecast: LocationForecast,
    pub cached: bool,
}

/// Shared entry point for weather lookups.
///
/// Concurrent misses for the same location each go upstream; the last one to
/// finish wins the cache slot.
#[derive(Debug)]
pub struct WeatherService {
    provider: Option<Arc<dyn ForecastProvider>>,
    cache: ForecastCache,
}

impl WeatherService {
    pub fn new(provider: Option<Arc<dyn ForecastProvider>>, cache: ForecastCache) -> Self {
        Self { provider, cache }
    }

    /// Build the service from config. A missing API key is not fatal here;
    /// lookups report it instead.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let provider = match provider_from_config(config) {
            Ok(provider) => Some(provider),
            Err(WeatherError::MissingApiKey) => {
                warn!("{} is not set; weather requests will fail", crate::config::API_KEY_ENV);
                None
            }
            Err(err) => return Err(err),
        };

        let cache = ForecastCache::with_ttl(Duration::from_secs(config.cache_ttl_secs));
        Ok(Self::new(provider, cache))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    pub async fn forecast(&self, input: &str) -> Result<ForecastOutcome, WeatherError> {
        let provider = self.provider.as_ref().ok_or(WeatherError::MissingApiKey)?;
        let canonical = location::resolve(input)?;

        if let Some(forecast) = self.cache.get(canonical).await {
            return Ok(ForecastOutcome {
                forecast,
                cached: true,
            });
        }

        let upstream = provider.fetch(canonical).await?;
        let forecast = forecast::transform(&upstream.location, &upstream.dataset_description);
        debug!(location = canonical, periods = forecast.forecasts.len(), "forecast reshaped");

        self.cache.set(canonical, forecast.clone()).await;

        Ok(ForecastOutcome {
            forecast,
            cached: false,
        })
    }
}
