//! Configuration management for Tollgate.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, TollgateError};

/// Prefix for environment overrides, e.g. `TOLLGATE__BUCKET__RATE=2.5`.
const ENV_PREFIX: &str = "TOLLGATE";
const ENV_SEPARATOR: &str = "__";

/// Main configuration for Tollgate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TollgateConfig {
    /// Token bucket parameters
    #[serde(default)]
    pub bucket: BucketConfig,

    /// Demonstration driver settings
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Token bucket parameters.
///
/// Values are not checked here; `TokenBucket::from_config` rejects
/// non-positive settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Tokens added per second of elapsed time
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Maximum tokens the bucket may hold
    #[serde(default = "default_capacity")]
    pub capacity: f64,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            capacity: default_capacity(),
        }
    }
}

fn default_rate() -> f64 {
    1.0
}

fn default_capacity() -> f64 {
    5.0
}

/// Demonstration driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Number of decisions to request
    #[serde(default = "default_requests")]
    pub requests: u32,

    /// Pause between consecutive requests, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            requests: default_requests(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_requests() -> u32 {
    10
}

fn default_interval_ms() -> u64 {
    500
}

impl TollgateConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| TollgateError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Load configuration from a YAML file.
    ///
    /// Also serves as the file layer of [`TollgateConfig::load`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration file");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from defaults, an optional file, and the environment.
    ///
    /// Later sources win: environment variables override the file, which
    /// overrides the built-in defaults. The file is always read as YAML,
    /// whatever its extension.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// Environment source for `TOLLGATE__SECTION__KEY` overrides.
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }

    fn load_with_env(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&base)?)
            .add_source(environment)
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
