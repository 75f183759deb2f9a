use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    WeatherError,
    forecast::ElementKind,
    model::CwaResponse,
    provider::{ForecastProvider, UpstreamForecast},
};

/// 36-hour county/city forecast dataset.
pub const DEFAULT_ENDPOINT: &str =
    "https://opendata.cwa.gov.tw/api/v1/rest/datastore/F-C0032-001";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Central Weather Administration open-data API.
#[derive(Debug, Clone)]
pub struct CwaProvider {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl CwaProvider {
    pub fn new(api_key: String, endpoint: String, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            endpoint,
            http,
        })
    }
}

#[async_trait]
impl ForecastProvider for CwaProvider {
    async fn fetch(&self, location: &str) -> Result<UpstreamForecast, WeatherError> {
        info!(location, "fetching forecast from CWA");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("Authorization", self.api_key.as_str()),
                ("locationName", location),
                ("elementName", ElementKind::REQUESTED),
                ("format", "JSON"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = res.status();
        let body = res.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            warn!(location, %status, "CWA request failed");
            let details = serde_json::from_str::<Value>(&body).ok();
            let message = details
                .as_ref()
                .and_then(|d| d.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| truncate_body(&body));

            return Err(WeatherError::Upstream {
                status: Some(status.as_u16()),
                message,
                details,
            });
        }

        let parsed: CwaResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("{e}: {}", truncate_body(&body))))?;

        if parsed.success.as_deref().is_some_and(|s| s != "true") {
            return Err(WeatherError::Upstream {
                status: None,
                message: "CWA reported an unsuccessful response".to_string(),
                details: serde_json::from_str(&body).ok(),
            });
        }

        let records = parsed.records.ok_or_else(|| WeatherError::Upstream {
            status: None,
            message: "CWA response contained no records".to_string(),
            details: None,
        })?;

        let location_record = records
            .location
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound {
                location: location.to_string(),
            })?;

        Ok(UpstreamForecast {
            dataset_description: records.dataset_description.unwrap_or_default(),
            location: location_record,
        })
    }
}

// Strip the URL: its query carries the API key.
fn map_transport_error(err: reqwest::Error) -> WeatherError {
    if err.is_timeout() {
        WeatherError::Timeout
    } else {
        WeatherError::Http(err.without_url())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
