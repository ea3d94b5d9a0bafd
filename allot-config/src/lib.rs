//! # Allot Configuration
//!
//! Layered configuration for the `allot` tools: compiled-in defaults, then
//! `config/allot.yaml`, then `ALLOT_*` environment variables (`__` separates
//! nested keys, e.g. `ALLOT_ALLOCATOR__DEFAULT_KIND=test`).

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod allocator;
mod error;
mod telemetry;
mod validation;

pub use allocator::{AllocatorConfig, AllocatorKind};
pub use error::ConfigError;
pub use telemetry::{MetricsConfig, TelemetryConfig};

const DEFAULT_PATH: &str = "config/allot.yaml";
const ENV_PREFIX: &str = "ALLOT_";

#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct AllotConfig {
    #[validate(nested)]
    #[serde(default)]
    pub allocator: AllocatorConfig,

    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AllotConfig {
    /// Load configuration from the default file and the environment.
    ///
    /// A missing `config/allot.yaml` is not an error; defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AllotConfig::default()));
        if Path::new(DEFAULT_PATH).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_PATH));
        }
        Self::extract(figment)
    }

    /// Load configuration from a specific file, which must exist.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment =
            Figment::from(Serialized::defaults(AllotConfig::default())).merge(Yaml::file(path));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
