use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// Routing providers speak GeoJSON, which orders positions as `[lon, lat]`.
    pub fn from_lon_lat([lon, lat]: [f64; 2]) -> Self {
        Self { lat, lon }
    }

    pub fn label(&self) -> String {
        format!("{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// Pollutant concentrations (µg/m³) for one measurement hour.
///
/// Every concentration defaults to zero when the provider omits it or sends
/// `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pm25: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pm10: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub no2: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub o3: f64,
}

/// Reads an explicit `null` the same way `#[serde(default)]` reads a missing
/// field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Goes over the wire as `{"rank", "label", "css_class"}` so clients can
/// render a badge without their own lookup table. Only `rank` is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "CategoryWire", try_from = "CategoryWire")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitiveGroups,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy (SG)",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Short style class used by map markers and badges.
    pub fn css_class(self) -> &'static str {
        match self {
            AqiCategory::Good => "good",
            AqiCategory::Moderate => "mod",
            AqiCategory::UnhealthyForSensitiveGroups => "usg",
            AqiCategory::Unhealthy => "unhl",
            AqiCategory::VeryUnhealthy => "vh",
            AqiCategory::Hazardous => "haz",
        }
    }

    pub fn rank(self) -> u8 {
        self as u8
    }
}

#[derive(Serialize, Deserialize)]
struct CategoryWire {
    rank: u8,
    #[serde(default)]
    label: String,
    #[serde(default)]
    css_class: String,
}

impl From<AqiCategory> for CategoryWire {
    fn from(category: AqiCategory) -> Self {
        Self {
            rank: category.rank(),
            label: category.label().to_string(),
            css_class: category.css_class().to_string(),
        }
    }
}

impl TryFrom<CategoryWire> for AqiCategory {
    type Error = String;

    fn try_from(wire: CategoryWire) -> Result<Self, Self::Error> {
        AqiCategory::ALL
            .get(usize::from(wire.rank))
            .copied()
            .ok_or_else(|| format!("unknown AQI category rank {}", wire.rank))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryTier {
    Acceptable,
    Elevated,
    High,
    Severe,
}

impl AdvisoryTier {
    pub fn message(self) -> &'static str {
        match self {
            AdvisoryTier::Severe => {
                "Avoid outdoor travel if possible. Use N95 mask, keep car windows closed, and use recirculation mode."
            }
            AdvisoryTier::High => {
                "Sensitive groups should avoid long exposure. Consider mask and shorter stops."
            }
            AdvisoryTier::Elevated => {
                "Moderate risk. If you feel discomfort, reduce outdoor time. Mask can help."
            }
            AdvisoryTier::Acceptable => {
                "Air quality looks acceptable for most people. Still avoid heavy outdoor exertion near traffic."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAirSummary {
    pub sample_count: usize,
    pub mean_aqi: u16,
    pub max_aqi: u16,
    pub mean_category: AqiCategory,
    pub worst_category: AqiCategory,
    pub advisory: AdvisoryTier,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    pub index: usize,
    pub coordinate: Coordinate,
    pub reading: PollutantReading,
    pub aqi: u16,
    pub category: AqiCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAirReport {
    pub samples: Vec<SampleReport>,
    pub summary: RouteAirSummary,
}

/// A trip endpoint as the user supplied it: free text to geocode, or a point
/// picked on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Point {
        point: Coordinate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Query {
        query: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEndpoint {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Endpoints currently selected by one user session, before geocoding.
///
/// Owned by whoever drives the session (a UI, the CLI); the planner only
/// ever receives them as arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripEndpoints {
    pub from: Option<Endpoint>,
    pub to: Option<Endpoint>,
}

impl TripEndpoints {
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Fails on the first endpoint that has not been entered yet, FROM first.
    pub fn plan_request(&self, sampling: SamplingOptions) -> Result<PlanRequest, MissingEndpoint> {
        let from = self.from.clone().ok_or(MissingEndpoint::From)?;
        let to = self.to.clone().ok_or(MissingEndpoint::To)?;
        Ok(PlanRequest { from, to, sampling })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEndpoint {
    From,
    To,
}

impl fmt::Display for MissingEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let which = match self {
            MissingEndpoint::From => "FROM",
            MissingEndpoint::To => "TO",
        };
        write!(f, "Enter {which} location (or pick on map).")
    }
}

impl std::error::Error for MissingEndpoint {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            count: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub from: Endpoint,
    pub to: Endpoint,
    #[serde(default)]
    pub sampling: SamplingOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteOverview {
    pub path: Vec<Coordinate>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub distance_label: String,
    pub duration_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub from: ResolvedEndpoint,
    pub to: ResolvedEndpoint,
    pub route: RouteOverview,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air: Option<RouteAirReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub aqi: u16,
    pub category: AqiCategory,
    pub severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub coordinate: Coordinate,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseGeocodeResponse {
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

pub fn format_km(distance_m: f64) -> String {
    format!("{:.1} km", distance_m / 1000.0)
}

pub fn format_minutes(duration_s: f64) -> String {
    format!("{} min", (duration_s / 60.0).round())
}
