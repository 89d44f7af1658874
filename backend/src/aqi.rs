//! Heuristic air-quality index.
//!
//! This is NOT the EPA AQI. Each pollutant is normalized against a rough
//! "good" reference concentration, the normalized terms are blended into a
//! severity score and the score is mapped onto a 0-400 AQI-like scale. Useful
//! for comparing points along a route, not for regulatory reporting.

use crate::models::{AqiCategory, PollutantReading};

/// Reference "good" concentrations in µg/m³.
const PM25_REFERENCE: f64 = 12.0;
const PM10_REFERENCE: f64 = 45.0;
const NO2_REFERENCE: f64 = 40.0;
const O3_REFERENCE: f64 = 100.0;

/// Blend weights; they sum to 1.0 and make PM2.5 the dominant driver.
const PM25_WEIGHT: f64 = 0.45;
const PM10_WEIGHT: f64 = 0.25;
const NO2_WEIGHT: f64 = 0.18;
const O3_WEIGHT: f64 = 0.12;

/// A severity score of 1.0 (every pollutant at its reference) maps to 80.
const SEVERITY_SCALE: f64 = 80.0;
pub const MAX_AQI: u16 = 400;

/// Upper bounds (inclusive) of every category but the last.
const CATEGORY_BOUNDS: [(u16, AqiCategory); 5] = [
    (50, AqiCategory::Good),
    (100, AqiCategory::Moderate),
    (150, AqiCategory::UnhealthyForSensitiveGroups),
    (200, AqiCategory::Unhealthy),
    (300, AqiCategory::VeryUnhealthy),
];

/// Weighted, dimensionless severity of a reading. 1.0 means "at guideline".
pub fn severity_score(reading: &PollutantReading) -> f64 {
    PM25_WEIGHT * (reading.pm25 / PM25_REFERENCE)
        + PM10_WEIGHT * (reading.pm10 / PM10_REFERENCE)
        + NO2_WEIGHT * (reading.no2 / NO2_REFERENCE)
        + O3_WEIGHT * (reading.o3 / O3_REFERENCE)
}

/// Estimate the AQI-like index of one reading, clamped to `[0, 400]`.
pub fn estimate_aqi(reading: &PollutantReading) -> u16 {
    let scaled = (severity_score(reading) * SEVERITY_SCALE).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, f64::from(MAX_AQI)) as u16
}

pub fn categorize(aqi: u16) -> AqiCategory {
    CATEGORY_BOUNDS
        .iter()
        .find(|(bound, _)| aqi <= *bound)
        .map(|(_, category)| *category)
        .unwrap_or(AqiCategory::Hazardous)
}
