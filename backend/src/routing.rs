use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::{Coordinate, ProviderRoute};

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Anything able to return a path between two points.
///
/// Implementations must return the geometry in traversal order, origin first.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<ProviderRoute, ProviderError>;
}

/// Driving routes from an OSRM server.
pub struct OsrmRouteProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmRouteProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        // OSRM expects lon,lat
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson&alternatives=false&steps=false",
            self.base_url, from.lon, from.lat, to.lon, to.lat
        )
    }
}

#[async_trait]
impl RouteProvider for OsrmRouteProvider {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<ProviderRoute, ProviderError> {
        let url = self.route_url(from, to);
        tracing::debug!("OSRM request: {url}");

        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(ProviderError::Status(res.status().as_u16()));
        }
        let body: OsrmResponse = res.json().await?;
        parse_osrm_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: GeoJsonLineString,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLineString {
    coordinates: Vec<[f64; 2]>,
}

fn parse_osrm_response(body: OsrmResponse) -> Result<ProviderRoute, ProviderError> {
    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::NoData("No route found".into()))?;

    if route.geometry.coordinates.is_empty() {
        return Err(ProviderError::NoData("Route has no geometry".into()));
    }

    Ok(ProviderRoute {
        path: route
            .geometry
            .coordinates
            .into_iter()
            .map(Coordinate::from_lon_lat)
            .collect(),
        distance_m: route.distance,
        duration_s: route.duration,
    })
}

/// Offline provider: a straight, evenly subdivided line between the endpoints.
///
/// Useful for demos and tests when no routing server is reachable. Duration
/// assumes a constant urban driving speed.
pub struct StraightLineRouteProvider {
    pub speed_kmh: f64,
}

impl Default for StraightLineRouteProvider {
    fn default() -> Self {
        Self { speed_kmh: 30.0 }
    }
}

#[async_trait]
impl RouteProvider for StraightLineRouteProvider {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<ProviderRoute, ProviderError> {
        let path = straight_line(from, to);
        let distance_km = approximate_distance_km(&path);
        let duration_s = if self.speed_kmh > 0.0 {
            distance_km / self.speed_kmh * 3_600.0
        } else {
            0.0
        };

        Ok(ProviderRoute {
            path,
            distance_m: distance_km * 1_000.0,
            duration_s,
        })
    }
}

pub fn straight_line(start: Coordinate, end: Coordinate) -> Vec<Coordinate> {
    const STEPS: usize = 32;
    (0..=STEPS)
        .map(|i| start.interpolate(end, i as f64 / STEPS as f64))
        .collect()
}

pub fn approximate_distance_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
