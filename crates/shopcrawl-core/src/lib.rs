//! Shared domain types and configuration for shopcrawl.

pub mod app_config;
pub mod category;
pub mod config;
pub mod currency;
pub mod products;
pub mod sites;

use thiserror::Error;

pub use app_config::AppConfig;
pub use category::{prefix_for, GENERIC_PREFIX};
pub use config::{load_app_config, load_app_config_from_env};
pub use currency::RateTable;
pub use products::{round_price, ProductRow, COLUMNS, DEFAULT_CATEGORY, UNKNOWN_CUSTOM_CATEGORY};
pub use sites::{load_sites, validate_site, Platform, SiteConfig, SitesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[from] serde_yaml::Error),

    #[error("sites validation failed: {0}")]
    Validation(String),
}
