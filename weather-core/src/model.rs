use serde::{Deserialize, Serialize};

/// One forecast window as served to clients.
///
/// Every field is a display string; an empty string means "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub start_time: String,
    pub end_time: String,
    pub weather: String,
    pub rain: String,
    pub min_temp: String,
    pub max_temp: String,
    pub comfort: String,
}

/// Simplified 36-hour forecast for one county/city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationForecast {
    pub city: String,
    pub update_time: String,
    pub forecasts: Vec<ForecastPeriod>,
}

// Upstream payload (CWA open data, dataset F-C0032-001).

#[derive(Debug, Clone, Deserialize)]
pub struct CwaResponse {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub records: Option<CwaRecords>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwaRecords {
    #[serde(default)]
    pub dataset_description: Option<String>,
    #[serde(default)]
    pub location: Vec<CwaLocation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwaLocation {
    pub location_name: String,
    #[serde(default)]
    pub weather_element: Vec<CwaWeatherElement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwaWeatherElement {
    pub element_name: String,
    #[serde(default)]
    pub time: Vec<CwaTimePeriod>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwaTimePeriod {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub parameter: Option<CwaParameter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwaParameter {
    #[serde(default)]
    pub parameter_name: Option<String>,
}

impl CwaTimePeriod {
    /// The displayed value of this period, if any.
    pub fn value(&self) -> Option<&str> {
        self.parameter
            .as_ref()
            .and_then(|p| p.parameter_name.as_deref())
            .filter(|v| !v.is_empty())
    }
}
