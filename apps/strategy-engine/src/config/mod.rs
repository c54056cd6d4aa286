//! Configuration module for the strategy engine.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before use.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strategy_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("OCO leg delay: {:?}", config.strategy.oco_leg_delay());
//! ```

mod observability;
mod strategy;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};
pub use strategy::StrategyConfig;

/// Upper bound (exclusive) for basis-point settings.
const MAX_BPS: u32 = 10_000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Strategy execution policy.
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml)?;
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Read a required environment variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if the variable is unset or empty.
pub fn require_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

/// Interpolate environment variables in a string.
///
/// Supports `${VAR}` (required) and `${VAR:-default}` syntax.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<Option<regex::Regex>> = OnceLock::new();

    let Some(re) = ENV_VAR_REGEX
        .get_or_init(|| regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").ok())
    else {
        return Ok(input.to_string());
    };

    let mut result = input.to_string();
    for cap in re.captures_iter(input) {
        let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let var_name = var_match.as_str();

        let value = match (std::env::var(var_name), cap.get(2)) {
            (Ok(v), _) if !v.is_empty() => v,
            (_, Some(default)) => default.as_str().to_string(),
            _ => return Err(ConfigError::MissingEnvVar(var_name.to_string())),
        };

        result = result.replace(full_match.as_str(), &value);
    }

    Ok(result)
}

/// Validate configuration values.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` naming the first offending field.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let strategy = &config.strategy;

    if strategy.stop_limit_buffer_bps >= MAX_BPS {
        return Err(ConfigError::ValidationError(format!(
            "strategy.stop_limit_buffer_bps must be below {MAX_BPS}"
        )));
    }

    if strategy.twap_limit_offset_bps >= MAX_BPS {
        return Err(ConfigError::ValidationError(format!(
            "strategy.twap_limit_offset_bps must be below {MAX_BPS}"
        )));
    }

    if config.observability.logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "observability.logging.level must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::TimeInForce;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.strategy.oco_leg_delay_ms, 100);
        assert_eq!(config.strategy.stop_limit_buffer_bps, 50);
        assert_eq!(config.strategy.twap_limit_offset_bps, 10);
        assert_eq!(config.strategy.time_in_force, TimeInForce::Gtc);
        assert_eq!(config.observability.logging.level, "info");
        assert_eq!(config.observability.logging.format, LogFormat::Json);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_empty_sections_uses_defaults() {
        let config = match load_config_from_string("strategy: {}\n") {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "level: ${STRATEGY_CONFIG_TEST_NONEXISTENT_VAR:-debug}";
        let result = interpolate_env_vars(input).unwrap();
        assert_eq!(result, "level: debug");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)]
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input).unwrap();

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_is_required() {
        let input = "api_key: ${STRATEGY_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        let Err(err) = interpolate_env_vars(input) else {
            panic!("expected missing env var error");
        };
        assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "STRATEGY_CONFIG_TEST_UNLIKELY_TO_EXIST"));
    }

    #[test]
    fn test_require_env_missing() {
        assert!(matches!(
            require_env("STRATEGY_CONFIG_TEST_UNLIKELY_TO_EXIST"),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_validation_buffer_out_of_range() {
        let yaml = r"
strategy:
  stop_limit_buffer_bps: 10000
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for oversized buffer");
        };
        assert!(err.to_string().contains("stop_limit_buffer_bps"));
    }

    #[test]
    fn test_validation_offset_out_of_range() {
        let yaml = r"
strategy:
  twap_limit_offset_bps: 20000
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for oversized offset");
        };
        assert!(err.to_string().contains("twap_limit_offset_bps"));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            load_config_from_string("strategy: [unclosed"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
strategy:
  oco_leg_delay_ms: 250
  stop_limit_buffer_bps: 25
  twap_limit_offset_bps: 5
  time_in_force: IOC

observability:
  logging:
    level: "debug"
    format: "pretty"
    include_spans: false
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert_eq!(config.strategy.oco_leg_delay(), std::time::Duration::from_millis(250));
        assert_eq!(config.strategy.stop_limit_buffer_bps, 25);
        assert_eq!(config.strategy.twap_limit_offset_bps, 5);
        assert_eq!(config.strategy.time_in_force, TimeInForce::Ioc);
        assert_eq!(config.observability.logging.level, "debug");
        assert_eq!(config.observability.logging.format, LogFormat::Pretty);
        assert!(!config.observability.logging.include_spans);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strategy:\n  oco_leg_delay_ms: 0").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.strategy.oco_leg_delay_ms, 0);
    }

    #[test]
    fn test_load_config_missing_file() {
        let Err(err) = load_config(Some("/nonexistent/strategy-engine.yaml")) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
