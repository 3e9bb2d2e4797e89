pub mod app_config;
pub mod config;
pub mod geo;
pub mod pricing;

pub use app_config::{AppConfig, Environment, NearbySearchConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, distance_meters, Coordinate};
pub use pricing::{
    annotate_distances, summarize_prices, DistanceAnnotatedRecord, PriceRecord, PriceSummary,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
