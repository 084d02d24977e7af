pub mod app_config;
pub mod config;
pub mod fixture;
pub mod locations;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use fixture::{load_locations_file, LocationsFile};
pub use locations::{Center, City, Selection, State};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read locations file {path}: {source}")]
    FixtureIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse locations file: {0}")]
    FixtureParse(#[source] serde_yaml::Error),

    #[error("locations validation failed: {0}")]
    Validation(String),
}
