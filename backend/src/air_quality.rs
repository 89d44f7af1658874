use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;
use shared::null_as_default;

use crate::error::ProviderError;
use crate::models::{Coordinate, PollutantReading};

/// Source of pollutant readings at a coordinate.
#[async_trait]
pub trait PollutantProvider: Send + Sync {
    /// Reading for the hour closest to now.
    async fn reading_at(&self, at: Coordinate) -> Result<PollutantReading, ProviderError>;
}

/// Hourly forecasts from the Open-Meteo air-quality API.
pub struct OpenMeteoAirQuality {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoAirQuality {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn query_url(&self, at: Coordinate) -> String {
        format!(
            "{}/v1/air-quality?latitude={}&longitude={}&hourly=pm10,pm2_5,nitrogen_dioxide,ozone&timezone=auto",
            self.base_url, at.lat, at.lon
        )
    }
}

#[async_trait]
impl PollutantProvider for OpenMeteoAirQuality {
    async fn reading_at(&self, at: Coordinate) -> Result<PollutantReading, ProviderError> {
        let res = self.client.get(self.query_url(at)).send().await?;
        if !res.status().is_success() {
            return Err(ProviderError::Status(res.status().as_u16()));
        }
        let body: AirQualityResponse = res.json().await?;
        closest_reading(body, Utc::now())
    }
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    utc_offset_seconds: i64,
    hourly: Option<HourlySeries>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlySeries {
    #[serde(default, deserialize_with = "null_as_default")]
    time: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pm10: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pm2_5: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    nitrogen_dioxide: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    ozone: Vec<Option<f64>>,
}

/// Pick the hourly record closest to `now`.
///
/// Timestamps are local to the queried location (`timezone=auto`), so `now`
/// is shifted by the reported UTC offset before comparing.
fn closest_reading(
    body: AirQualityResponse,
    now: DateTime<Utc>,
) -> Result<PollutantReading, ProviderError> {
    let hourly = match body.hourly {
        Some(hourly) if !hourly.time.is_empty() => hourly,
        _ => return Err(ProviderError::NoData("No air data".into())),
    };

    let local_now = Duration::try_seconds(body.utc_offset_seconds)
        .and_then(|offset| now.naive_utc().checked_add_signed(offset))
        .ok_or_else(|| {
            ProviderError::NoData(format!(
                "invalid UTC offset {} seconds",
                body.utc_offset_seconds
            ))
        })?;
    let idx = closest_hour_index(&hourly.time, local_now);

    Ok(PollutantReading {
        time: hourly.time[idx].clone(),
        pm25: value_at(&hourly.pm2_5, idx),
        pm10: value_at(&hourly.pm10, idx),
        no2: value_at(&hourly.nitrogen_dioxide, idx),
        o3: value_at(&hourly.ozone, idx),
    })
}

/// Earliest index with the smallest distance to `now`. Unparseable
/// timestamps never win; if none parse the first record is used.
fn closest_hour_index(times: &[String], now: NaiveDateTime) -> usize {
    let mut best_idx = 0;
    let mut best_diff = None;

    for (idx, raw) in times.iter().enumerate() {
        let Some(t) = parse_hour(raw) else {
            continue;
        };
        let diff = (t - now).num_seconds().abs();
        if best_diff.map_or(true, |best| diff < best) {
            best_diff = Some(diff);
            best_idx = idx;
        }
    }

    best_idx
}

fn parse_hour(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn value_at(series: &[Option<f64>], idx: usize) -> f64 {
    series.get(idx).copied().flatten().unwrap_or(0.0)
}
