use backend::{
    config::AppConfig,
    live_providers,
    models::{Coordinate, Endpoint, PlanResponse, SamplingOptions, TripEndpoints},
    planner::Planner,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Plan a route and estimate air-quality exposure along it"
)]
struct Args {
    /// Origin: a place name, or "lat,lon"
    #[arg(long)]
    from: Option<String>,

    /// Destination: a place name, or "lat,lon"
    #[arg(long)]
    to: Option<String>,

    /// Number of points to sample along the route
    #[arg(long)]
    samples: Option<usize>,

    /// Only plan the route, skip air-quality sampling
    #[arg(long)]
    no_samples: bool,

    /// Swap origin and destination before planning
    #[arg(long)]
    swap: bool,

    /// Use a straight line instead of querying the routing server
    #[arg(long)]
    offline: bool,
}

fn parse_endpoint(raw: &str) -> Endpoint {
    let parsed = raw.split_once(',').and_then(|(lat, lon)| {
        Some(Coordinate {
            lat: lat.trim().parse().ok()?,
            lon: lon.trim().parse().ok()?,
        })
    });

    match parsed {
        Some(point) => Endpoint::Point { point, label: None },
        None => Endpoint::Query {
            query: raw.to_string(),
        },
    }
}

fn trip_from_args(args: &Args) -> TripEndpoints {
    let mut trip = TripEndpoints {
        from: args.from.as_deref().map(parse_endpoint),
        to: args.to.as_deref().map(parse_endpoint),
    };
    if args.swap {
        trip.swap();
    }
    trip
}

fn print_plan(plan: &PlanResponse) {
    println!("From: {}", plan.from.label);
    println!("To:   {}", plan.to.label);
    println!(
        "Distance: {}  Duration: {}",
        plan.route.distance_label, plan.route.duration_label
    );

    let Some(air) = &plan.air else {
        println!("Route ready (AQI sampling off).");
        return;
    };

    for sample in &air.samples {
        let r = &sample.reading;
        println!(
            "Point {:>2}  {:.4}, {:.4}  {}  PM2.5: {:.1} | PM10: {:.1} | NO2: {:.1} | O3: {:.1}  AQI {} ({})",
            sample.index + 1,
            sample.coordinate.lat,
            sample.coordinate.lon,
            r.time,
            r.pm25,
            r.pm10,
            r.no2,
            r.o3,
            sample.aqi,
            sample.category.label()
        );
    }

    let summary = &air.summary;
    println!(
        "Average AQI: {} ({})  Worst AQI: {} ({})",
        summary.mean_aqi,
        summary.mean_category.label(),
        summary.max_aqi,
        summary.worst_category.label()
    );
    println!("Recommendation: {}", summary.advice);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let req = trip_from_args(&args).plan_request(SamplingOptions {
        enabled: !args.no_samples,
        count: args.samples,
    })?;

    let config = AppConfig::from_env()?;
    let planner = Planner::new(
        live_providers(&config, args.offline)?,
        config.default_sample_count,
        config.max_sample_count,
    );

    let plan = planner
        .plan(&req, |done, total| {
            tracing::info!("Fetching air data ({done}/{total})");
        })
        .await?;
    print_plan(&plan);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(
            parse_endpoint("23.25, 77.41"),
            Endpoint::Point {
                point: Coordinate {
                    lat: 23.25,
                    lon: 77.41
                },
                label: None
            }
        );
        assert_eq!(
            parse_endpoint("Bhopal, India"),
            Endpoint::Query {
                query: "Bhopal, India".into()
            }
        );
    }

    #[test]
    fn test_missing_endpoint_follows_swap() {
        let args = Args::parse_from(["plan_route", "--to", "Indore", "--swap"]);
        let trip = trip_from_args(&args);
        assert_eq!(
            trip.from,
            Some(Endpoint::Query {
                query: "Indore".into()
            })
        );

        let err = trip.plan_request(SamplingOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Enter TO location (or pick on map).");

        let args = Args::parse_from(["plan_route", "--to", "Indore"]);
        let err = trip_from_args(&args)
            .plan_request(SamplingOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Enter FROM location (or pick on map).");
    }
}
