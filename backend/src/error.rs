use std::fmt;

use thiserror::Error;

/// Which external collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStage {
    Geocoding,
    Routing,
    AirQuality,
}

impl fmt::Display for ProviderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderStage::Geocoding => "geocoding",
            ProviderStage::Routing => "routing",
            ProviderStage::AirQuality => "air quality",
        };
        f.write_str(name)
    }
}

/// Failure reported by one of the HTTP provider clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider answered with HTTP {0}")]
    Status(u16),
    #[error("{0}")]
    NoData(String),
}

#[derive(Debug, Error)]
pub enum AirRouteError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{stage} provider failed{}: {message}", sample_suffix(.sample_index))]
    ProviderFailure {
        stage: ProviderStage,
        sample_index: Option<usize>,
        message: String,
    },
}

impl AirRouteError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AirRouteError::InvalidArgument(message.into())
    }

    pub fn provider(stage: ProviderStage, err: ProviderError) -> Self {
        AirRouteError::ProviderFailure {
            stage,
            sample_index: None,
            message: err.to_string(),
        }
    }

    pub fn at_sample(index: usize, err: ProviderError) -> Self {
        AirRouteError::ProviderFailure {
            stage: ProviderStage::AirQuality,
            sample_index: Some(index),
            message: err.to_string(),
        }
    }
}

fn sample_suffix(index: &Option<usize>) -> String {
    match index {
        // Sample numbers are shown 1-based, like the per-point listing.
        Some(i) => format!(" at sample {}", i + 1),
        None => String::new(),
    }
}
