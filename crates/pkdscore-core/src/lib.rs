//! Shared domain for pkdscore: configuration, the PKD section catalogue, tag
//! configuration, and the pure scoring functions used by collectors and the
//! API.

pub mod app_config;
pub mod config;
pub mod scoring;
pub mod sectors;
pub mod tags;

pub use app_config::{AppConfig, Environment, SourceKeys};
pub use config::{load_app_config, load_app_config_from_env};
pub use scoring::blend::{
    blend, blend_one, merge_platforms, BlendInputs, BlendedScore, MarketValue, SourceScores,
    SourceValue,
};
pub use sectors::{normalize_code, section, section_for_pkd_code, Section, SECTIONS};
pub use tags::{load_tags, TagConfig, TagsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tags file {path}: {source}")]
    TagsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tags file: {0}")]
    TagsFileParse(#[source] serde_yaml::Error),

    #[error("invalid tags configuration: {0}")]
    Validation(String),
}
