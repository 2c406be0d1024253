//! Application settings loading from config.toml and the environment.
//!
//! Settings come from an optional TOML file with per-field defaults; the database URL
//! can additionally be overridden through the `DATABASE_URL` environment variable so
//! deployments can relocate the data file without editing the config.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

fn default_database_url() -> String {
    super::database::DEFAULT_DATABASE_URL.to_string()
}

const fn default_low_stock_threshold() -> f64 {
    5.0
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Where the durable snapshot table lives
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Stock level at or below which a low-stock notification is raised
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration: `./config.toml` when present, defaults
/// otherwise, with the database URL overridable through `DATABASE_URL`.
///
/// # Errors
/// Returns an error only when a config file exists but cannot be parsed; a missing
/// file is not an error.
pub fn load_app_configuration() -> Result<AppConfig> {
    let mut config = if Path::new("config.toml").exists() {
        load_config("config.toml")?
    } else {
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            database_url = "sqlite://shop/data.sqlite?mode=rwc"
            low_stock_threshold = 3.0
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database_url, "sqlite://shop/data.sqlite?mode=rwc");
        assert_eq!(config.low_stock_threshold, 3.0);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.database_url, default_database_url());
        assert_eq!(config.low_stock_threshold, 5.0);
    }
}
