pub use shared::{
    AdvisoryTier, ApiError, AqiCategory, Coordinate, Endpoint, EstimateResponse, MissingEndpoint,
    Place, PlanRequest, PlanResponse, PollutantReading, ResolvedEndpoint, ReverseGeocodeResponse,
    RouteAirReport, RouteAirSummary, RouteOverview, SampleReport, SamplingOptions, TripEndpoints,
};

/// Route as delivered by a routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    /// Traversal-ordered geometry, origin first.
    pub path: Vec<Coordinate>,
    pub distance_m: f64,
    pub duration_s: f64,
}
