use crate::aqi::categorize;
use crate::error::AirRouteError;
use crate::models::{AdvisoryTier, RouteAirSummary};

/// Summarize the per-sample indices of one route.
///
/// The mean rounds half up. Advice depends only on the worst sample, since a
/// single bad stretch matters more than a clean average.
pub fn summarize(estimates: &[u16]) -> Result<RouteAirSummary, AirRouteError> {
    let Some(&max_aqi) = estimates.iter().max() else {
        return Err(AirRouteError::invalid(
            "cannot summarize a route without air samples",
        ));
    };

    let mean_aqi = rounded_mean(estimates);
    let advisory = advisory_for(max_aqi);

    Ok(RouteAirSummary {
        sample_count: estimates.len(),
        mean_aqi,
        max_aqi,
        mean_category: categorize(mean_aqi),
        worst_category: categorize(max_aqi),
        advisory,
        advice: advisory.message().to_string(),
    })
}

pub fn advisory_for(max_aqi: u16) -> AdvisoryTier {
    match max_aqi {
        201.. => AdvisoryTier::Severe,
        151..=200 => AdvisoryTier::High,
        101..=150 => AdvisoryTier::Elevated,
        _ => AdvisoryTier::Acceptable,
    }
}

fn rounded_mean(values: &[u16]) -> u16 {
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    let count = values.len() as u64;
    // floor((sum / count) + 0.5) in integer arithmetic
    ((2 * sum + count) / (2 * count)) as u16
}
