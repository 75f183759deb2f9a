use thiserror::Error;

/// Failures surfaced by the forecast service.
///
/// Every variant maps onto an HTTP status and a short machine-readable kind
/// so the server can render it without inspecting messages.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("CWA API key is not configured. Set CWA_API_KEY or run `tw-weather configure`.")]
    MissingApiKey,

    #[error("No location was given")]
    EmptyLocation,

    #[error("Unsupported location '{input}'")]
    UnsupportedLocation { input: String, resolved: String },

    #[error("No forecast data found for '{location}'")]
    LocationNotFound { location: String },

    #[error("Upstream request failed: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Upstream request timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse upstream response: {0}")]
    Parse(String),
}

impl WeatherError {
    /// Short tag used as the `error` field of a failure envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            WeatherError::MissingApiKey => "missing_api_key",
            WeatherError::EmptyLocation => "invalid_location",
            WeatherError::UnsupportedLocation { .. } => "unsupported_location",
            WeatherError::LocationNotFound { .. } => "location_not_found",
            WeatherError::Upstream { .. } => "upstream_error",
            WeatherError::Timeout => "upstream_timeout",
            WeatherError::Http(_) => "upstream_unreachable",
            WeatherError::Parse(_) => "upstream_parse_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            WeatherError::EmptyLocation | WeatherError::UnsupportedLocation { .. } => 400,
            WeatherError::LocationNotFound { .. } => 404,
            WeatherError::Upstream { status: Some(status), .. } => *status,
            WeatherError::MissingApiKey
            | WeatherError::Upstream { status: None, .. }
            | WeatherError::Timeout
            | WeatherError::Http(_)
            | WeatherError::Parse(_) => 500,
        }
    }

    /// Input errors carry the allowed-location list back to the client.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            WeatherError::EmptyLocation | WeatherError::UnsupportedLocation { .. }
        )
    }
}
