pub mod air_quality;
pub mod aqi;
pub mod assessment;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod models;
pub mod planner;
pub mod routing;
pub mod sampling;
pub mod summary;

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::air_quality::OpenMeteoAirQuality;
use crate::aqi::{categorize, estimate_aqi, severity_score};
use crate::config::{AppConfig, ConfigError};
use crate::error::{AirRouteError, ProviderStage};
use crate::geocoding::NominatimGeocoder;
use crate::models::{
    ApiError, Coordinate, EstimateResponse, Place, PlanRequest, PlanResponse, PollutantReading,
    ReverseGeocodeResponse,
};
use crate::planner::{validate_coordinate, Planner, Providers};
use crate::routing::{OsrmRouteProvider, RouteProvider, StraightLineRouteProvider};

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<Planner>,
}

/// Providers backed by the public OSRM, Nominatim and Open-Meteo services.
///
/// With `offline_routing` the route is a straight line instead of an OSRM
/// query; geocoding and air quality still go over the network.
pub fn live_providers(config: &AppConfig, offline_routing: bool) -> Result<Providers, ConfigError> {
    let client = config.http_client()?;
    let router: Arc<dyn RouteProvider> = if offline_routing {
        Arc::new(StraightLineRouteProvider::default())
    } else {
        Arc::new(OsrmRouteProvider::new(client.clone(), &config.osrm_url))
    };

    Ok(Providers {
        geocoder: Arc::new(NominatimGeocoder::new(client.clone(), &config.nominatim_url)),
        router,
        air: Arc::new(OpenMeteoAirQuality::new(client, &config.air_quality_url)),
    })
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/plan", post(plan_handler))
        .route("/api/air/estimate", post(estimate_handler))
        .route("/api/geocode/search", get(search_handler))
        .route("/api/geocode/reverse", get(reverse_handler))
        .layer(cors)
        .with_state(state)
}

async fn plan_handler(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, (StatusCode, Json<ApiError>)> {
    let response = state
        .planner
        .plan(&req, |done, total| {
            tracing::info!("Fetching air data ({done}/{total})");
        })
        .await
        .map_err(api_error)?;

    Ok(Json(response))
}

async fn estimate_handler(Json(reading): Json<PollutantReading>) -> Json<EstimateResponse> {
    let aqi = estimate_aqi(&reading);
    Json(EstimateResponse {
        aqi,
        category: categorize(aqi),
        severity: severity_score(&reading),
    })
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Place>, (StatusCode, Json<ApiError>)> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(api_error(AirRouteError::invalid("search query is empty")));
    }

    state
        .planner
        .geocoder()
        .search(query)
        .await
        .map(Json)
        .map_err(|err| api_error(AirRouteError::provider(ProviderStage::Geocoding, err)))
}

/// Reverse geocoding only feeds a display label, so a provider failure falls
/// back to the formatted coordinate instead of failing the request.
async fn reverse_handler(
    State(state): State<AppState>,
    Query(point): Query<Coordinate>,
) -> Result<Json<ReverseGeocodeResponse>, (StatusCode, Json<ApiError>)> {
    validate_coordinate(point, "picked").map_err(api_error)?;

    let label = match state.planner.geocoder().reverse(point).await {
        Ok(label) => label,
        Err(err) => {
            tracing::warn!("Reverse geocoding failed for {}: {}", point.label(), err);
            point.label()
        }
    };
    Ok(Json(ReverseGeocodeResponse { label }))
}

fn api_error(err: AirRouteError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        AirRouteError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        AirRouteError::ProviderFailure { .. } => StatusCode::BAD_GATEWAY,
    };
    if status.is_server_error() {
        tracing::error!("{err}");
    }
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
