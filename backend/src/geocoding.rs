use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::{Coordinate, Place};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for a free-text query.
    async fn search(&self, query: &str) -> Result<Place, ProviderError>;

    /// Human-readable label for a point.
    async fn reverse(&self, at: Coordinate) -> Result<String, ProviderError>;
}

/// Geocoding through a Nominatim instance.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    display_name: Option<String>,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Place, ProviderError> {
        let res = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "json"), ("limit", "1"), ("q", query)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(ProviderError::Status(res.status().as_u16()));
        }
        let hits: Vec<SearchHit> = res.json().await?;
        first_place(query, hits)
    }

    async fn reverse(&self, at: Coordinate) -> Result<String, ProviderError> {
        let lat = at.lat.to_string();
        let lon = at.lon.to_string();
        let res = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(ProviderError::Status(res.status().as_u16()));
        }
        let hit: ReverseHit = res.json().await?;
        Ok(reverse_label(at, hit))
    }
}

fn first_place(query: &str, hits: Vec<SearchHit>) -> Result<Place, ProviderError> {
    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::NoData(format!("Place not found: {query}")))?;

    let parse = |raw: &str| {
        raw.parse::<f64>()
            .map_err(|_| ProviderError::NoData(format!("invalid coordinate {raw:?} for {query}")))
    };

    Ok(Place {
        coordinate: Coordinate {
            lat: parse(&hit.lat)?,
            lon: parse(&hit.lon)?,
        },
        name: hit.display_name,
    })
}

fn reverse_label(at: Coordinate, hit: ReverseHit) -> String {
    hit.display_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| at.label())
}
