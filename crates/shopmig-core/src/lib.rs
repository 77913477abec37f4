//! Shared configuration and destination-side domain types for `shopmig`.

pub mod app_config;
pub mod config;
pub mod products;
pub mod profile;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    AssembledProduct, DescriptionSegment, InventoryQuantity, RelatedProducts, Tag, TagOrigin,
    VariantOption, VariantRecord,
};
pub use profile::{load_profile, ExportProfile, TablePrefixes};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read export profile {path}: {source}")]
    ProfileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse export profile: {0}")]
    ProfileParse(#[from] serde_yaml::Error),

    #[error("export profile validation failed: {0}")]
    Validation(String),
}
