use crate::air_quality::PollutantProvider;
use crate::aqi::{categorize, estimate_aqi};
use crate::error::AirRouteError;
use crate::models::{Coordinate, PollutantReading, RouteAirReport, SampleReport};
use crate::sampling::sample_coordinates;
use crate::summary::summarize;

/// Sample a route and assess air quality at every sample.
pub async fn assess_route<F>(
    provider: &dyn PollutantProvider,
    path: &[Coordinate],
    sample_count: usize,
    on_progress: F,
) -> Result<RouteAirReport, AirRouteError>
where
    F: FnMut(usize, usize),
{
    let points = sample_coordinates(path, sample_count)?;
    tracing::info!(
        "Sampling air quality at {} of {} route points",
        points.len(),
        path.len()
    );
    assess_samples(provider, &points, on_progress).await
}

/// Fetch one reading per point, strictly in order, then summarize.
///
/// `on_progress(done, total)` runs after each point. The first provider
/// failure aborts the batch: no further fetches are issued and no partial
/// summary is produced.
pub async fn assess_samples<F>(
    provider: &dyn PollutantProvider,
    points: &[Coordinate],
    mut on_progress: F,
) -> Result<RouteAirReport, AirRouteError>
where
    F: FnMut(usize, usize),
{
    if points.is_empty() {
        return Err(AirRouteError::invalid("no sample points to assess"));
    }

    let total = points.len();
    let mut samples = Vec::with_capacity(total);

    for (index, &coordinate) in points.iter().enumerate() {
        tracing::debug!("Fetching air data ({}/{})", index + 1, total);
        let reading = provider.reading_at(coordinate).await.map_err(|err| {
            tracing::warn!("Air data fetch failed at sample {}: {}", index + 1, err);
            AirRouteError::at_sample(index, err)
        })?;

        let sample = report_sample(index, coordinate, reading);
        tracing::debug!(
            "Sample {} at {:.4}, {:.4}: AQI {} ({})",
            index + 1,
            coordinate.lat,
            coordinate.lon,
            sample.aqi,
            sample.category.label()
        );
        samples.push(sample);
        on_progress(index + 1, total);
    }

    let estimates: Vec<u16> = samples.iter().map(|s| s.aqi).collect();
    let summary = summarize(&estimates)?;
    tracing::info!(
        "Route air summary: mean AQI {}, worst AQI {} ({})",
        summary.mean_aqi,
        summary.max_aqi,
        summary.worst_category.label()
    );

    Ok(RouteAirReport { samples, summary })
}

pub fn report_sample(index: usize, coordinate: Coordinate, reading: PollutantReading) -> SampleReport {
    let aqi = estimate_aqi(&reading);
    SampleReport {
        index,
        coordinate,
        reading,
        aqi,
        category: categorize(aqi),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{ProviderError, ProviderStage};
    use crate::models::{AdvisoryTier, AqiCategory};

    /// Serves readings by call order, failing on `fail_at`.
    struct ScriptedProvider {
        pm25: Vec<f64>,
        fail_at: Option<usize>,
        calls: Mutex<Vec<Coordinate>>,
    }

    impl ScriptedProvider {
        fn new(pm25: Vec<f64>, fail_at: Option<usize>) -> Self {
            Self {
                pm25,
                fail_at,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PollutantProvider for ScriptedProvider {
        async fn reading_at(&self, at: Coordinate) -> Result<PollutantReading, ProviderError> {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.len();
            calls.push(at);
            if self.fail_at == Some(n) {
                return Err(ProviderError::Status(503));
            }
            Ok(PollutantReading {
                time: format!("2026-10-19T{:02}:00", n),
                pm25: self.pm25[n],
                ..Default::default()
            })
        }
    }

    fn points(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| Coordinate {
                lat: 45.0 + i as f64 * 0.001,
                lon: 5.0,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_assess_in_order_with_progress() {
        // pm25 only: aqi = round(0.45 * pm25 / 12 * 80) = round(3 * pm25)
        let provider = ScriptedProvider::new(vec![10.0, 40.0, 80.0], None);
        let pts = points(3);
        let mut progress = Vec::new();

        let report = assess_samples(&provider, &pts, |done, total| progress.push((done, total)))
            .await
            .unwrap();

        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(*provider.calls.lock().unwrap(), pts);
        let aqis: Vec<u16> = report.samples.iter().map(|s| s.aqi).collect();
        assert_eq!(aqis, vec![30, 120, 240]);
        assert_eq!(report.samples[1].index, 1);
        assert_eq!(report.samples[1].category, AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(report.summary.mean_aqi, 130);
        assert_eq!(report.summary.max_aqi, 240);
        assert_eq!(report.summary.advisory, AdvisoryTier::Severe);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_fetches() {
        let provider = ScriptedProvider::new(vec![10.0; 5], Some(2));
        let mut progress = Vec::new();

        let err = assess_samples(&provider, &points(5), |done, total| progress.push((done, total)))
            .await
            .unwrap_err();

        match err {
            AirRouteError::ProviderFailure {
                stage,
                sample_index,
                ..
            } => {
                assert_eq!(stage, ProviderStage::AirQuality);
                assert_eq!(sample_index, Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.calls.lock().unwrap().len(), 3);
        assert_eq!(progress, vec![(1, 5), (2, 5)]);
    }

    #[tokio::test]
    async fn test_no_points_is_invalid() {
        let provider = ScriptedProvider::new(Vec::new(), None);
        let err = assess_samples(&provider, &[], |_, _| {}).await.unwrap_err();
        assert!(matches!(err, AirRouteError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_assess_route_samples_first() {
        let provider = ScriptedProvider::new(vec![0.0; 5], None);
        let path = points(10);

        let report = assess_route(&provider, &path, 5, |_, _| {}).await.unwrap();

        let expected: Vec<Coordinate> = [0, 2, 4, 6, 9].iter().map(|&i| path[i]).collect();
        assert_eq!(*provider.calls.lock().unwrap(), expected);
        assert_eq!(report.samples.len(), 5);
        assert_eq!(report.summary.advisory, AdvisoryTier::Acceptable);
    }

    #[test]
    fn test_report_sample_at_reference() {
        let reading = PollutantReading {
            time: "2026-10-19T10:00".into(),
            pm25: 12.0,
            pm10: 45.0,
            no2: 40.0,
            o3: 100.0,
        };
        let sample = report_sample(
            0,
            Coordinate {
                lat: 23.0,
                lon: 77.0,
            },
            reading,
        );
        assert_eq!(sample.aqi, 80);
        assert_eq!(sample.category, AqiCategory::Moderate);
    }
}
