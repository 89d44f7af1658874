use std::sync::Arc;

use backend::{config::AppConfig, create_router, live_providers, planner::Planner, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("valid configuration");
    let providers = live_providers(&config, false).expect("build provider clients");
    tracing::info!(
        "Providers: routing {}, geocoding {}, air quality {}",
        config.osrm_url,
        config.nominatim_url,
        config.air_quality_url
    );

    let planner = Planner::new(
        providers,
        config.default_sample_count,
        config.max_sample_count,
    );
    let state = AppState {
        planner: Arc::new(planner),
    };
    let app = create_router(state);

    let addr = config.bind_addr;
    tracing::info!("Starting backend on http://{addr}");
    tracing::info!("API endpoints:");
    tracing::info!("  POST /api/plan - Route plus air-quality samples along it");
    tracing::info!("  POST /api/air/estimate - AQI estimate for one pollutant reading");
    tracing::info!("  GET /api/geocode/search?q= - Geocode a place name");
    tracing::info!("  GET /api/geocode/reverse?lat=&lon= - Label for a picked point");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener");
    axum::serve(listener, app).await.expect("serve backend");
}
