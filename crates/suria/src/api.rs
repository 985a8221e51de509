//! REST API for the dashboard frontend.
//!
//! Lightweight HTTP endpoints the caller nests under `/api/v1`. Handlers are
//! generic over the `TextGenerator` seam so tests run against canned
//! generators instead of the live service. Every failure path produces a
//! well-formed JSON envelope; nothing here is fatal to the process.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::estimate::{self, SolarEstimate};
use crate::forecast::{self, DaypartOutlook, ForecastClient, ForecastRecord};
use crate::genai::TextGenerator;
use crate::validation;

// ── State ───────────────────────────────────────────────────────────

/// Shared handler state. Everything inside is immutable per request.
pub struct AppState<G> {
    pub feed: ForecastClient,
    pub generator: G,
    /// Location used when a query does not name one.
    pub default_location: String,
}

// ── Envelopes ───────────────────────────────────────────────────────

/// Success envelope for the forecast pass-through.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiForecastResponse {
    pub success: bool,
    pub data: Vec<ForecastRecord>,
}

/// Error envelope shared by all endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Latest-forecast payload: the selected record plus its daypart outlook.
#[derive(Debug, Serialize, Deserialize)]
pub struct LatestForecast {
    pub record: ForecastRecord,
    pub outlook: Vec<DaypartOutlook>,
}

/// Success envelope for the latest-forecast query; `data` is null when the
/// location has no records yet — absence, not an error.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiLatestResponse {
    pub success: bool,
    pub data: Option<LatestForecast>,
}

/// One entry of the static panel-condition mock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelStatus {
    pub panel_id: u8,
    pub yield_kwh: u32,
    pub condition: String,
}

/// Static dashboard mock: electricity gauge plus panel conditions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiPanelsResponse {
    pub success: bool,
    pub electricity_pct: u8,
    pub panels: Vec<PanelStatus>,
}

/// Query parameters for forecast endpoints.
#[derive(Debug, Deserialize)]
struct ForecastQuery {
    #[serde(default)]
    location_name: Option<String>,
}

/// Request body for the estimate endpoint.
#[derive(Debug, Deserialize)]
struct EstimateRequest {
    #[serde(rename = "weatherData")]
    weather_data: ForecastRecord,
    city: String,
}

fn error_response(status: StatusCode, error: impl std::fmt::Display) -> Response {
    (
        status,
        Json(ApiErrorResponse {
            success: false,
            error: error.to_string(),
        }),
    )
        .into_response()
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /forecast — the full feed data set, unfiltered.
///
/// `location_name` is accepted for parity with the frontend but does not
/// filter; selection happens in `/forecast/latest` or on the client.
async fn get_forecast<G: TextGenerator>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<ForecastQuery>,
) -> Response {
    if let Some(name) = &query.location_name {
        log::debug!("forecast requested for location '{}'", name);
    }

    match state.feed.fetch_all().await {
        Ok(data) => Json(ApiForecastResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => {
            log::error!("forecast feed request failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// GET /forecast/latest — most recent record for one location.
async fn get_latest_forecast<G: TextGenerator>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<ForecastQuery>,
) -> Response {
    let name = query
        .location_name
        .as_deref()
        .unwrap_or(&state.default_location);
    if let Err(e) = validation::validate_location_name(name) {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid location name: {}", e));
    }

    match state.feed.fetch_all().await {
        Ok(records) => {
            let data = forecast::select_latest(&records, name).map(|record| LatestForecast {
                outlook: forecast::outlook(record),
                record: record.clone(),
            });
            Json(ApiLatestResponse {
                success: true,
                data,
            })
            .into_response()
        }
        Err(e) => {
            log::error!("forecast feed request failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// POST /estimate — blended daily efficiency via the generation service.
///
/// 200 with the parsed estimate on success; 500 with the fixed fallback
/// payload after retries are exhausted, so callers can tell a degraded
/// answer from a real one by status alone.
async fn post_estimate<G: TextGenerator>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<EstimateRequest>,
) -> Response {
    if let Err(e) = validation::validate_location_name(&req.city) {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid location name: {}", e));
    }

    match estimate::request_estimate(&state.generator, &req.weather_data, &req.city).await {
        Ok(est) => Json(est).into_response(),
        Err(e) => {
            log::error!("estimate degraded to fallback: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SolarEstimate::unavailable()),
            )
                .into_response()
        }
    }
}

/// GET /panels — static panel-condition mock shown on the dashboard.
async fn get_panels() -> Json<ApiPanelsResponse> {
    Json(panels_response())
}

fn panels_response() -> ApiPanelsResponse {
    ApiPanelsResponse {
        success: true,
        electricity_pct: 70,
        panels: (1..=4)
            .map(|panel_id| PanelStatus {
                panel_id,
                yield_kwh: 949,
                condition: "Good".to_string(),
            })
            .collect(),
    }
}

/// Build the `/api/v1` router. Caller nests this under `/api/v1`.
pub fn api_router<G: TextGenerator + 'static>(state: Arc<AppState<G>>) -> Router {
    Router::new()
        .route("/forecast", get(get_forecast::<G>))
        .route("/forecast/latest", get(get_latest_forecast::<G>))
        .route("/estimate", post(post_estimate::<G>))
        .route("/panels", get(get_panels))
        .with_state(state)
}

// ── Tests ───────────────────────────────────────────────────────────
