//! Orchestrator configuration.
//!
//! Configuration can be loaded from:
//! - a TOML file (default: ~/.config/sources/orchestrator.toml) with an
//!   `[orchestrator]` table
//! - environment variables (`SOURCES_*` prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use sources_actions::config::OrchestratorConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = OrchestratorConfig::load().expect("Failed to load config");
//!
//! // Or from environment variables
//! let config = OrchestratorConfig::from_env().expect("Invalid SOURCES_* variables");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use sources_core::{defaults, SortDirection};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "sources_actions=info".to_string(),
        }
    }
}

/// Initial list parameters and store behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub page_size: usize,
    pub page_number: usize,
    pub sort_by: String,
    pub sort_direction: SortDirection,
    /// Broadcast buffer; slow subscribers past this many events lag.
    pub event_bus_capacity: usize,
    /// Drop list responses that belong to a superseded request.
    pub guard_stale_responses: bool,
    /// Title stored with a normalized list-load failure.
    pub load_error_title: String,
    pub log: LogConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::PAGE_SIZE,
            page_number: defaults::PAGE_NUMBER,
            sort_by: defaults::SORT_BY.to_string(),
            sort_direction: SortDirection::default(),
            event_bus_capacity: defaults::EVENT_BUS_CAPACITY,
            guard_stale_responses: true,
            load_error_title: defaults::LOAD_ENTITIES_ERROR_TITLE.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Default configuration file path.
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("sources");
        path.push("orchestrator.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading orchestrator config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            Self::from_env()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse an `[orchestrator]` table. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            orchestrator: OrchestratorConfig,
        }

        let root: TomlRoot = toml::from_str(content)?;
        root.orchestrator.validate()?;
        Ok(root.orchestrator)
    }

    /// Load configuration from environment variables.
    ///
    /// Unparseable values are ignored in favor of the defaults; parseable but
    /// out-of-range values are rejected by [`Self::validate`].
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();

        let page_size = env::var("SOURCES_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.page_size);
        let sort_by = env::var("SOURCES_SORT_BY").unwrap_or(defaults.sort_by);
        let sort_direction = env::var("SOURCES_SORT_DIRECTION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.sort_direction);
        let event_bus_capacity = env::var("SOURCES_EVENT_BUS_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.event_bus_capacity);
        let guard_stale_responses = env::var("SOURCES_GUARD_STALE_RESPONSES")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(defaults.guard_stale_responses);
        let format = env::var("SOURCES_LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.log.format);
        let filter = env::var("SOURCES_LOG_FILTER").unwrap_or(defaults.log.filter);

        let config = Self {
            page_size,
            page_number: defaults.page_number,
            sort_by,
            sort_direction,
            event_bus_capacity,
            guard_stale_responses,
            load_error_title: defaults.load_error_title,
            log: LogConfig { format, filter },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::Validation(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.page_number == 0 {
            return Err(ConfigError::Validation(
                "page_number is 1-based".to_string(),
            ));
        }
        if self.event_bus_capacity == 0 {
            return Err(ConfigError::Validation(
                "event_bus_capacity must be at least 1".to_string(),
            ));
        }
        if self.sort_by.is_empty() {
            return Err(ConfigError::Validation(
                "sort_by cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.page_number, 1);
        assert_eq!(config.sort_by, "created_at");
        assert_eq!(config.sort_direction, SortDirection::Desc);
        assert!(config.guard_stale_responses);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial_table() {
        let config = OrchestratorConfig::from_toml_str(
            r#"
            [orchestrator]
            page_size = 50
            sort_by = "name"
            sort_direction = "asc"

            [orchestrator.log]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.page_size, 50);
        assert_eq!(config.sort_by, "name");
        assert_eq!(config.sort_direction, SortDirection::Asc);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.filter, "sources_actions=info");
        assert_eq!(config.event_bus_capacity, defaults::EVENT_BUS_CAPACITY);
    }

    #[test]
    fn test_from_toml_missing_table_uses_defaults() {
        let config = OrchestratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, OrchestratorConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_zero_page_size() {
        let err = OrchestratorConfig::from_toml_str("[orchestrator]\npage_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_from_toml_parse_error() {
        let err = OrchestratorConfig::from_toml_str("[orchestrator\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = OrchestratorConfig::from_file(Path::new("/nonexistent/orchestrator.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = OrchestratorConfig {
            event_bus_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    // The only test that touches SOURCES_* variables.
    #[test]
    fn test_from_env_validates() {
        env::set_var("SOURCES_PAGE_SIZE", "25");
        env::set_var("SOURCES_SORT_DIRECTION", "asc");
        let config = OrchestratorConfig::from_env().unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.sort_direction, SortDirection::Asc);

        env::set_var("SOURCES_EVENT_BUS_CAPACITY", "0");
        let err = OrchestratorConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        env::set_var("SOURCES_EVENT_BUS_CAPACITY", "not-a-number");
        assert_eq!(
            OrchestratorConfig::from_env().unwrap().event_bus_capacity,
            defaults::EVENT_BUS_CAPACITY
        );

        env::remove_var("SOURCES_PAGE_SIZE");
        env::remove_var("SOURCES_SORT_DIRECTION");
        env::remove_var("SOURCES_EVENT_BUS_CAPACITY");
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::Text.to_string(), "text");
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_default_config_path() {
        let path = OrchestratorConfig::default_config_path();
        assert!(path.ends_with("sources/orchestrator.toml"));
    }
}
