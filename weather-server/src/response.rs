//! JSON envelopes shared by every endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tw_weather_core::{WeatherError, location::CANONICAL_LOCATIONS};

#[derive(Debug, Serialize)]
struct Success<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "is_false")]
    cached: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

pub fn success<T: Serialize>(data: T) -> Response {
    success_with_cache_flag(data, false)
}

pub fn success_with_cache_flag<T: Serialize>(data: T, cached: bool) -> Response {
    Json(Success {
        success: true,
        data,
        cached,
    })
    .into_response()
}

/// Failure envelope: `{ success: false, error, message, ...extra }`.
pub fn failure(
    status: StatusCode,
    error: &str,
    message: impl Into<String>,
    extra: Map<String, Value>,
) -> Response {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(false));
    body.insert("error".into(), Value::String(error.to_string()));
    body.insert("message".into(), Value::String(message.into()));
    body.extend(extra);

    (status, Json(Value::Object(body))).into_response()
}

/// 400 for a location that could not even be read from the request.
pub fn invalid_location(message: impl Into<String>) -> Response {
    let mut extra = Map::new();
    extra.insert("allowed".into(), json!(CANONICAL_LOCATIONS));
    failure(StatusCode::BAD_REQUEST, "invalid_location", message, extra)
}

/// Renders a [`WeatherError`] with the status its class calls for.
#[derive(Debug)]
pub struct ApiError(pub WeatherError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut extra = Map::new();
        match &err {
            WeatherError::EmptyLocation => {
                extra.insert("allowed".into(), json!(CANONICAL_LOCATIONS));
            }
            WeatherError::UnsupportedLocation { input, resolved } => {
                extra.insert("input".into(), json!(input));
                extra.insert("resolved".into(), json!(resolved));
                extra.insert("allowed".into(), json!(CANONICAL_LOCATIONS));
            }
            WeatherError::LocationNotFound { location } => {
                extra.insert("location".into(), json!(location));
            }
            WeatherError::Upstream {
                status: upstream_status,
                details,
                ..
            } => {
                if let Some(code) = upstream_status {
                    extra.insert("upstreamStatus".into(), json!(code));
                }
                if let Some(details) = details {
                    extra.insert("details".into(), details.clone());
                }
            }
            _ => {}
        }

        if status.is_server_error() {
            tracing::warn!(kind = err.kind(), error = %err, "weather request failed");
        }

        failure(status, err.kind(), err.to_string(), extra)
    }
}
