use std::sync::Arc;

use crate::air_quality::PollutantProvider;
use crate::assessment::assess_route;
use crate::error::{AirRouteError, ProviderStage};
use crate::geocoding::Geocoder;
use crate::models::{
    Coordinate, Endpoint, PlanRequest, PlanResponse, ResolvedEndpoint, RouteOverview,
    SamplingOptions,
};
use crate::routing::RouteProvider;

const PICKED_LABEL: &str = "Picked location";

/// External collaborators used while planning.
#[derive(Clone)]
pub struct Providers {
    pub geocoder: Arc<dyn Geocoder>,
    pub router: Arc<dyn RouteProvider>,
    pub air: Arc<dyn PollutantProvider>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    From,
    To,
}

impl EndpointRole {
    fn name(self) -> &'static str {
        match self {
            EndpointRole::From => "FROM",
            EndpointRole::To => "TO",
        }
    }
}

/// Stateless trip planner: geocode, route, then optionally sample air quality.
///
/// Endpoints arrive with every request; nothing about a previous trip is kept.
#[derive(Clone)]
pub struct Planner {
    providers: Providers,
    default_sample_count: usize,
    max_sample_count: usize,
}

impl Planner {
    pub fn new(providers: Providers, default_sample_count: usize, max_sample_count: usize) -> Self {
        Self {
            providers,
            default_sample_count,
            max_sample_count,
        }
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.providers.geocoder.as_ref()
    }

    /// Validated sample count, or `None` when sampling is switched off.
    pub fn sample_count(&self, options: &SamplingOptions) -> Result<Option<usize>, AirRouteError> {
        if !options.enabled {
            return Ok(None);
        }
        let count = options.count.unwrap_or(self.default_sample_count);
        if count == 0 || count > self.max_sample_count {
            return Err(AirRouteError::invalid(format!(
                "sample count must be between 1 and {}, got {count}",
                self.max_sample_count
            )));
        }
        Ok(Some(count))
    }

    pub async fn resolve(
        &self,
        endpoint: &Endpoint,
        role: EndpointRole,
    ) -> Result<ResolvedEndpoint, AirRouteError> {
        match endpoint {
            Endpoint::Point { point, label } => {
                validate_coordinate(*point, role.name())?;
                Ok(ResolvedEndpoint {
                    coordinate: *point,
                    label: label.clone().unwrap_or_else(|| PICKED_LABEL.to_string()),
                })
            }
            Endpoint::Query { query } => {
                let query = query.trim();
                if query.is_empty() {
                    return Err(AirRouteError::invalid(format!(
                        "Enter {} location (or pick on map).",
                        role.name()
                    )));
                }
                tracing::debug!("Geocoding {} endpoint {query:?}", role.name());
                let place = self
                    .providers
                    .geocoder
                    .search(query)
                    .await
                    .map_err(|err| AirRouteError::provider(ProviderStage::Geocoding, err))?;
                Ok(ResolvedEndpoint {
                    coordinate: place.coordinate,
                    label: place.name,
                })
            }
        }
    }

    /// Plan one trip. `on_progress(done, total)` is forwarded from the air
    /// sampling stage.
    pub async fn plan<F>(&self, req: &PlanRequest, on_progress: F) -> Result<PlanResponse, AirRouteError>
    where
        F: FnMut(usize, usize),
    {
        let sample_count = self.sample_count(&req.sampling)?;

        let from = self.resolve(&req.from, EndpointRole::From).await?;
        let to = self.resolve(&req.to, EndpointRole::To).await?;

        tracing::info!("Finding route {} -> {}", from.label, to.label);
        let route = self
            .providers
            .router
            .route(from.coordinate, to.coordinate)
            .await
            .map_err(|err| AirRouteError::provider(ProviderStage::Routing, err))?;
        tracing::info!(
            "Route ready: {} points, {:.0} m, {:.0} s",
            route.path.len(),
            route.distance_m,
            route.duration_s
        );

        let air = match sample_count {
            Some(count) => {
                Some(assess_route(self.providers.air.as_ref(), &route.path, count, on_progress).await?)
            }
            None => {
                tracing::info!("Route ready (AQI sampling off)");
                None
            }
        };

        Ok(PlanResponse {
            from,
            to,
            route: RouteOverview {
                distance_label: shared::format_km(route.distance_m),
                duration_label: shared::format_minutes(route.duration_s),
                path: route.path,
                distance_m: route.distance_m,
                duration_s: route.duration_s,
            },
            air,
        })
    }
}

/// Rejects NaN, infinite and out-of-range points before they reach a provider.
/// `what` names the point in the error message.
pub fn validate_coordinate(point: Coordinate, what: &str) -> Result<(), AirRouteError> {
    let valid = point.lat.is_finite()
        && point.lon.is_finite()
        && (-90.0..=90.0).contains(&point.lat)
        && (-180.0..=180.0).contains(&point.lon);
    if valid {
        Ok(())
    } else {
        Err(AirRouteError::invalid(format!(
            "{what} point {}, {} is not a valid coordinate",
            point.lat,
            point.lon
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ProviderError;
    use crate::models::{Place, PollutantReading, ProviderRoute};

    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn search(&self, query: &str) -> Result<Place, ProviderError> {
            match query {
                "Old Town" => Ok(Place {
                    coordinate: Coordinate { lat: 45.0, lon: 5.0 },
                    name: "Old Town, Somewhere".into(),
                }),
                _ => Err(ProviderError::NoData(format!("Place not found: {query}"))),
            }
        }

        async fn reverse(&self, at: Coordinate) -> Result<String, ProviderError> {
            Ok(at.label())
        }
    }

    struct TenPointRouter;

    #[async_trait]
    impl RouteProvider for TenPointRouter {
        async fn route(&self, from: Coordinate, to: Coordinate) -> Result<ProviderRoute, ProviderError> {
            let path = (0..10).map(|i| from.interpolate(to, i as f64 / 9.0)).collect();
            Ok(ProviderRoute {
                path,
                distance_m: 4_260.0,
                duration_s: 540.0,
            })
        }
    }

    #[derive(Default)]
    struct CountingAir {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl PollutantProvider for CountingAir {
        async fn reading_at(&self, _at: Coordinate) -> Result<PollutantReading, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            Ok(PollutantReading {
                time: "2026-10-19T10:00".into(),
                pm25: 12.0,
                pm10: 45.0,
                no2: 40.0,
                o3: 100.0,
            })
        }
    }

    fn planner(air: Arc<CountingAir>) -> Planner {
        Planner::new(
            Providers {
                geocoder: Arc::new(FixedGeocoder),
                router: Arc::new(TenPointRouter),
                air,
            },
            5,
            25,
        )
    }

    fn request(from: Endpoint, sampling: SamplingOptions) -> PlanRequest {
        PlanRequest {
            from,
            to: Endpoint::Point {
                point: Coordinate { lat: 45.1, lon: 5.1 },
                label: None,
            },
            sampling,
        }
    }

    #[tokio::test]
    async fn test_plan_geocodes_routes_and_samples() {
        let air = Arc::new(CountingAir::default());
        let req = request(
            Endpoint::Query {
                query: "  Old Town ".into(),
            },
            SamplingOptions::default(),
        );

        let mut progress = Vec::new();
        let res = planner(air.clone())
            .plan(&req, |done, total| progress.push((done, total)))
            .await
            .unwrap();

        assert_eq!(res.from.label, "Old Town, Somewhere");
        assert_eq!(res.to.label, PICKED_LABEL);
        assert_eq!(res.route.path.len(), 10);
        assert_eq!(res.route.distance_label, "4.3 km");
        assert_eq!(res.route.duration_label, "9 min");

        let air_report = res.air.unwrap();
        assert_eq!(air_report.samples.len(), 5);
        assert_eq!(air_report.summary.mean_aqi, 80);
        assert_eq!(*air.calls.lock().unwrap(), 5);
        assert_eq!(progress.last(), Some(&(5, 5)));
    }

    #[tokio::test]
    async fn test_sampling_disabled_skips_air_provider() {
        let air = Arc::new(CountingAir::default());
        let req = request(
            Endpoint::Point {
                point: Coordinate { lat: 45.0, lon: 5.0 },
                label: Some("Home".into()),
            },
            SamplingOptions {
                enabled: false,
                count: None,
            },
        );

        let res = planner(air.clone()).plan(&req, |_, _| {}).await.unwrap();
        assert!(res.air.is_none());
        assert_eq!(res.from.label, "Home");
        assert_eq!(*air.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_is_invalid() {
        let req = request(
            Endpoint::Query { query: "   ".into() },
            SamplingOptions::default(),
        );
        let err = planner(Arc::new(CountingAir::default()))
            .plan(&req, |_, _| {})
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: Enter FROM location (or pick on map)."
        );
    }

    #[tokio::test]
    async fn test_unknown_place_is_geocoding_failure() {
        let req = request(
            Endpoint::Query {
                query: "Atlantis".into(),
            },
            SamplingOptions::default(),
        );
        let err = planner(Arc::new(CountingAir::default()))
            .plan(&req, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AirRouteError::ProviderFailure {
                stage: ProviderStage::Geocoding,
                sample_index: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_point_is_invalid() {
        let req = request(
            Endpoint::Point {
                point: Coordinate {
                    lat: 123.0,
                    lon: 5.0,
                },
                label: None,
            },
            SamplingOptions::default(),
        );
        let err = planner(Arc::new(CountingAir::default()))
            .plan(&req, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, AirRouteError::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_coordinate_rejects_non_finite() {
        let ok = Coordinate { lat: -90.0, lon: 180.0 };
        assert!(validate_coordinate(ok, "TO").is_ok());

        let err = validate_coordinate(Coordinate { lat: f64::NAN, lon: 5.0 }, "TO").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: TO point NaN, 5 is not a valid coordinate"
        );
        let far = Coordinate {
            lat: 45.0,
            lon: f64::INFINITY,
        };
        assert!(validate_coordinate(far, "TO").is_err());
    }

    #[test]
    fn test_sample_count_bounds() {
        let planner = planner(Arc::new(CountingAir::default()));
        let opts = |count| SamplingOptions {
            enabled: true,
            count,
        };
        assert_eq!(planner.sample_count(&opts(None)).unwrap(), Some(5));
        assert_eq!(planner.sample_count(&opts(Some(25))).unwrap(), Some(25));
        assert!(planner.sample_count(&opts(Some(0))).is_err());
        assert!(planner.sample_count(&opts(Some(26))).is_err());
    }
}
