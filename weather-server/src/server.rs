use std::{any::Any, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tw_weather_core::{
    Config, WeatherService,
    location::{CANONICAL_LOCATIONS, DEFAULT_LOCATION},
};

use crate::response::{ApiError, failure, invalid_location, success, success_with_cache_flag};

/// Shared state for the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/locations", get(locations))
        .route("/api/weather", get(weather_by_query))
        .route("/api/weather/kaohsiung", get(weather_kaohsiung))
        .route("/api/weather/{city}", get(weather_by_path))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let weather = WeatherService::from_config(&config).context("Failed to build weather service")?;
    let state = AppState {
        weather: Arc::new(weather),
    };

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutting down");
}

async fn index() -> Response {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Taiwan 36-hour weather forecast proxy for the CWA open-data API",
        "endpoints": {
            "health": "GET /api/health",
            "locations": "GET /api/locations",
            "weather": "GET /api/weather?city=<name>",
            "weatherByPath": "GET /api/weather/:city",
            "kaohsiung": "GET /api/weather/kaohsiung"
        }
    }))
    .into_response()
}

async fn health(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "upstreamConfigured": state.weather.is_configured(),
    }))
    .into_response()
}

#[derive(Debug, Serialize)]
struct LocationOption {
    name: &'static str,
    value: &'static str,
}

async fn locations() -> Response {
    let options: Vec<LocationOption> = CANONICAL_LOCATIONS
        .iter()
        .map(|&name| LocationOption { name, value: name })
        .collect();
    success(options)
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    city: Option<String>,
}

async fn weather_by_query(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return invalid_location(rejection.body_text()),
    };
    let city = query.city.as_deref().unwrap_or(DEFAULT_LOCATION);
    weather_for(&state, city).await
}

async fn weather_by_path(
    State(state): State<AppState>,
    city: Result<Path<String>, PathRejection>,
) -> Response {
    match city {
        Ok(Path(city)) => weather_for(&state, &city).await,
        Err(rejection) => invalid_location(rejection.body_text()),
    }
}

async fn weather_kaohsiung(State(state): State<AppState>) -> Response {
    weather_for(&state, DEFAULT_LOCATION).await
}

async fn weather_for(state: &AppState, city: &str) -> Response {
    match state.weather.forecast(city).await {
        Ok(outcome) => success_with_cache_flag(outcome.forecast, outcome.cached),
        Err(err) => ApiError(err).into_response(),
    }
}

async fn not_found(method: Method, uri: Uri) -> Response {
    failure(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("No route for {method} {}", uri.path()),
        Map::new(),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown internal error".to_string()
    };

    error!("handler panicked: {message}");
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        message,
        Map::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(config: &Config) -> Router {
        let weather = WeatherService::from_config(config).expect("service builds");
        router(AppState {
            weather: Arc::new(weather),
        })
    }

    fn configured(upstream: &MockServer) -> Config {
        Config {
            api_key: Some("TEST-KEY".into()),
            upstream_url: upstream.uri(),
            timeout_secs: 2,
            ..Config::default()
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn single_wx_payload(location_name: &str, value: &str) -> Value {
        json!({
            "success": "true",
            "records": {
                "datasetDescription": "三十六小時天氣預報",
                "location": [{
                    "locationName": location_name,
                    "weatherElement": [{
                        "elementName": "Wx",
                        "time": [{ "parameter": { "parameterName": value } }]
                    }]
                }]
            }
        })
    }

    #[tokio::test]
    async fn taipei_slug_returns_reshaped_forecast() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("locationName", "臺北市"))
            .respond_with(ResponseTemplate::new(200).set_body_json(single_wx_payload("臺北市", "晴")))
            .mount(&upstream)
            .await;

        let (status, body) = get_json(app(&configured(&upstream)), "/api/weather?city=taipei").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body.get("cached").is_none());
        assert_eq!(body["data"]["city"], "臺北市");

        let period = &body["data"]["forecasts"][0];
        assert_eq!(period["weather"], "晴");
        for field in ["startTime", "endTime", "rain", "minTemp", "maxTemp", "comfort"] {
            assert_eq!(period[field], "", "field {field}");
        }
    }

    #[tokio::test]
    async fn unsupported_city_lists_allowed_locations() {
        let upstream = MockServer::start().await;
        let (status, body) = get_json(
            app(&configured(&upstream)),
            "/api/weather?city=%E7%81%AB%E6%98%9F",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "unsupported_location");

        let allowed = body["allowed"].as_array().unwrap();
        assert_eq!(allowed.len(), 22);
        for name in CANONICAL_LOCATIONS {
            assert!(allowed.contains(&json!(name)), "missing {name}");
        }
    }

    #[tokio::test]
    async fn repeated_request_hits_upstream_once() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(single_wx_payload("高雄市", "多雲")))
            .expect(1)
            .mount(&upstream)
            .await;

        let app = app(&configured(&upstream));

        let (status, first) = get_json(app.clone(), "/api/weather/kaohsiung").await;
        assert_eq!(status, StatusCode::OK);
        assert!(first.get("cached").is_none());

        let (status, second) = get_json(app, "/api/weather?city=%E9%AB%98%E9%9B%84%E5%B8%82").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cached"], true);
        assert_eq!(second["data"], first["data"]);
    }

    #[tokio::test]
    async fn missing_city_defaults_to_kaohsiung() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("locationName", "高雄市"))
            .respond_with(ResponseTemplate::new(200).set_body_json(single_wx_payload("高雄市", "晴")))
            .expect(1)
            .mount(&upstream)
            .await;

        let (status, body) = get_json(app(&configured(&upstream)), "/api/weather").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["city"], "高雄市");
    }

    #[tokio::test]
    async fn path_segment_accepts_casual_spelling() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("locationName", "臺北市"))
            .respond_with(ResponseTemplate::new(200).set_body_json(single_wx_payload("臺北市", "陰")))
            .mount(&upstream)
            .await;

        let (status, body) = get_json(
            app(&configured(&upstream)),
            "/api/weather/%E5%8F%B0%E5%8C%97%E5%B8%82",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["forecasts"][0]["weather"], "陰");
    }

    #[tokio::test]
    async fn empty_city_is_a_bad_request() {
        let upstream = MockServer::start().await;
        let (status, body) = get_json(app(&configured(&upstream)), "/api/weather?city=").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_location");
        assert_eq!(body["allowed"].as_array().unwrap().len(), 22);
    }

    #[tokio::test]
    async fn undecodable_path_segment_is_a_json_bad_request() {
        let upstream = MockServer::start().await;
        let (status, body) = get_json(app(&configured(&upstream)), "/api/weather/%FF").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid_location");
        assert!(body["message"].is_string());
        assert_eq!(body["allowed"].as_array().unwrap().len(), 22);
    }

    #[tokio::test]
    async fn duplicate_city_parameter_is_a_json_bad_request() {
        let upstream = MockServer::start().await;
        let (status, body) =
            get_json(app(&configured(&upstream)), "/api/weather?city=a&city=b").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid_location");
        assert_eq!(body["allowed"].as_array().unwrap().len(), 22);
    }

    #[tokio::test]
    async fn unreachable_upstream_keeps_api_key_out_of_response() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = Config {
            api_key: Some("SECRET-KEY-123".into()),
            upstream_url: format!("http://{addr}/forecast"),
            timeout_secs: 2,
            ..Config::default()
        };

        let res = app(&config)
            .oneshot(
                Request::builder()
                    .uri("/api/weather?city=taipei")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("SECRET-KEY-123"));

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"], "upstream_unreachable");
    }

    #[tokio::test]
    async fn missing_api_key_is_a_server_error() {
        let (status, body) = get_json(app(&Config::default()), "/api/weather?city=taipei").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "missing_api_key");
    }

    #[tokio::test]
    async fn upstream_error_status_is_passed_through() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })))
            .mount(&upstream)
            .await;

        let (status, body) = get_json(app(&configured(&upstream)), "/api/weather?city=taipei").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "upstream_error");
        assert_eq!(body["upstreamStatus"], 401);
        assert_eq!(body["details"]["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn location_missing_upstream_is_not_found() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": "true",
                "records": { "location": [] }
            })))
            .mount(&upstream)
            .await;

        let (status, body) = get_json(app(&configured(&upstream)), "/api/weather?city=penghu").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "location_not_found");
        assert_eq!(body["location"], "澎湖縣");
    }

    #[tokio::test]
    async fn locations_lists_every_canonical_name() {
        let (status, body) = get_json(app(&Config::default()), "/api/locations").await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 22);
        for entry in data {
            assert_eq!(entry["name"], entry["value"]);
        }
    }

    #[tokio::test]
    async fn health_and_index_respond() {
        let (status, body) = get_json(app(&Config::default()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["upstreamConfigured"], false);

        let (status, body) = get_json(app(&Config::default()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"].is_object());
    }

    #[tokio::test]
    async fn unknown_route_is_structured_404() {
        let (status, body) = get_json(app(&Config::default()), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "not_found");
        assert!(body["message"].as_str().unwrap().contains("/api/nope"));
    }

    #[tokio::test]
    async fn panics_render_as_internal_error() {
        let res = handle_panic(Box::new("boom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "boom");
    }
}
