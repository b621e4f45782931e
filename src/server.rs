use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use anyhow::{Context, Result};
use serde::{de::Error as _, Deserialize, Deserializer};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{EngineConfig, ServiceConfig};
use crate::engine::{ChartEngine, HttpChartEngine, ProcessChartEngine};
use crate::error::ApiError;
use crate::location::{LocationResolver, NominatimGeocoder, TimeApiLookup};
use crate::services::chart::{BirthData, ChartService};
use crate::views;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub charts: Arc<ChartService>,
}

impl AppState {
    /// Wires the real geocoding, timezone and engine backends from `config`.
    pub fn from_config(config: ServiceConfig) -> Self {
        let geocoder = Arc::new(NominatimGeocoder::new(
            &config.geocoder_url,
            &config.geocoder_user_agent,
            config.geocoder_timeout,
        ));
        let timezones = Arc::new(TimeApiLookup::new(&config.timezone_url));
        let engine: Arc<dyn ChartEngine> = match &config.engine {
            EngineConfig::Http { url } => Arc::new(HttpChartEngine::new(url)),
            EngineConfig::Process { program, args } => Arc::new(ProcessChartEngine::new(program, args)),
        };

        let charts = ChartService::new(LocationResolver::new(geocoder, timezones), engine, &config.default_name);
        Self {
            config: Arc::new(config),
            charts: Arc::new(charts),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuery {
    #[serde(default, deserialize_with = "flag")]
    detailed: bool,
}

/// Query-string boolean: `true/false`, `1/0`, `yes/no`, `on/off`, `t/f`, `y/n`, any case.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err(D::Error::custom(format!("invalid boolean '{}'", raw))),
    }
}

fn cors_layer(config: &ServiceConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(health_check))
        .route("/birth_chart", post(birth_chart))
        .route("/charts/{division}", post(divisional_chart))
        .route("/planets", post(planets))
        .route("/dashas", post(dashas))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: ServiceConfig) -> Result<()> {
    let addr = config.bind_addr.clone();
    let app = router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Vedic Astrology API listening at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn body(payload: Result<Json<BirthData>, JsonRejection>) -> Result<BirthData, ApiError> {
    payload
        .map(|Json(data)| data)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;
    Json(serde_json::json!({
        "status": "healthy",
        "service": config.title,
        "description": config.description,
        "version": config.version,
        "endpoints": {
            "health": "GET /",
            "birth_chart": "POST /birth_chart?detailed={bool}",
            "divisional_chart": "POST /charts/{division}",
            "planets": "POST /planets",
            "dashas": "POST /dashas"
        }
    }))
}

async fn birth_chart(
    State(state): State<AppState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
    payload: Result<Json<BirthData>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let data = body(payload)?;

    let chart = state.charts.compute(&data).await?;
    let view = serde_json::to_value(views::summary(&chart, query.detailed))
        .map_err(|e| ApiError::Engine(e.into()))?;
    Ok(Json(view))
}

async fn divisional_chart(
    State(state): State<AppState>,
    Path(division): Path<String>,
    payload: Result<Json<BirthData>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let data = body(payload)?;

    let chart = state.charts.compute(&data).await?;
    let view = views::divisional(&chart.graph, &division)?;
    let view = serde_json::to_value(view).map_err(|e| ApiError::Engine(e.into()))?;
    Ok(Json(view))
}

async fn planets(
    State(state): State<AppState>,
    payload: Result<Json<BirthData>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let data = body(payload)?;

    let chart = state.charts.compute(&data).await?;
    let view = serde_json::to_value(views::planets(&chart.graph)).map_err(|e| ApiError::Engine(e.into()))?;
    Ok(Json(view))
}

async fn dashas(
    State(state): State<AppState>,
    payload: Result<Json<BirthData>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let data = body(payload)?;

    let chart = state.charts.compute(&data).await?;
    Ok(Json(views::dashas(&chart.graph)))
}
