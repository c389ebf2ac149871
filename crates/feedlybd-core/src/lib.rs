//! Shared configuration for feedlybd: environment-driven application config
//! and the YAML feed/folder registry consumed by the ingestion pipeline.

pub mod app_config;
pub mod config;
pub mod feeds;

pub use app_config::{AppConfig, Environment, RelayMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use feeds::{load_feeds, FeedSource, FeedsFile, Folder, Selection};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read feeds file {path}: {source}")]
    FeedsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feeds file: {0}")]
    FeedsFileParse(#[from] serde_yaml::Error),

    #[error("feeds validation error: {0}")]
    Validation(String),
}
