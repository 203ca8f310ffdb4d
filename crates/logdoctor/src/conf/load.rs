//! Load — config loading from file and environment variables.

use std::path::{Path, PathBuf};
use std::fs::File;
use std::io::Read;
use thiserror::Error;

use super::model::AnalyzerConfig;

pub const DEFAULT_CONFIG_FILE: &str = "logdoctor.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl AnalyzerConfig {
    /// Load configuration.
    /// Priority: Environment Variables > Config File > Defaults
    ///
    /// An explicit path must exist; the default/env path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::from_file(path)?
            }
            None => {
                let config_path = std::env::var("LOGDOCTOR_CONFIG_FILE")
                    .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
                if Path::new(&config_path).exists() {
                    tracing::info!("Loading configuration from: {}", config_path);
                    Self::from_file(Path::new(&config_path))?
                } else {
                    tracing::debug!("Config file not found at {}, using defaults", config_path);
                    Self::default()
                }
            }
        };

        config.apply_env(|name| std::env::var(name).ok());
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::open(path).map_err(io_err)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(io_err)?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Environment variables override file config for thresholds.
    /// Unparseable values are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut f64); 3] = [
            ("LOGDOCTOR_BITRATE_DIVISOR", &mut self.thresholds.bitrate_divisor),
            ("LOGDOCTOR_OVERLOAD_WARNING_PCT", &mut self.thresholds.overload_warning_pct),
            ("LOGDOCTOR_OVERLOAD_CRITICAL_PCT", &mut self.thresholds.overload_critical_pct),
        ];

        for (name, slot) in overrides {
            let Some(raw) = lookup(name) else {
                continue;
            };
            match raw.trim().parse::<f64>() {
                Ok(value) => *slot = value,
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", name, raw, e),
            }
        }
    }
}
