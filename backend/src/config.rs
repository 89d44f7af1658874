use std::{env, net::SocketAddr, time::Duration};

const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";
const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com";
const DEFAULT_USER_AGENT: &str = concat!("route-air-planner/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Settings read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub osrm_url: String,
    pub nominatim_url: String,
    pub air_quality_url: String,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub default_sample_count: usize,
    pub max_sample_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            air_quality_url: DEFAULT_AIR_QUALITY_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(20),
            default_sample_count: 8,
            max_sample_count: 25,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = parse_var(&lookup, "BIND_ADDR")?.unwrap_or(defaults.bind_addr);
        let timeout_secs: Option<u64> = parse_var(&lookup, "HTTP_TIMEOUT_SECS")?;
        let default_sample_count =
            parse_var(&lookup, "DEFAULT_SAMPLE_COUNT")?.unwrap_or(defaults.default_sample_count);
        let max_sample_count =
            parse_var(&lookup, "MAX_SAMPLE_COUNT")?.unwrap_or(defaults.max_sample_count);

        if max_sample_count == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_SAMPLE_COUNT",
                value: max_sample_count.to_string(),
            });
        }
        if default_sample_count == 0 || default_sample_count > max_sample_count {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_SAMPLE_COUNT",
                value: default_sample_count.to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            osrm_url: lookup("OSRM_URL").unwrap_or(defaults.osrm_url),
            nominatim_url: lookup("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            air_quality_url: lookup("AIR_QUALITY_URL").unwrap_or(defaults.air_quality_url),
            user_agent: lookup("HTTP_USER_AGENT").unwrap_or(defaults.user_agent),
            http_timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            default_sample_count,
            max_sample_count,
        })
    }

    /// Shared client for every provider. Nominatim rejects requests without a
    /// User-Agent.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.http_timeout)
            .build()?)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
