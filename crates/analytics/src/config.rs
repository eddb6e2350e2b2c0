use serde::Deserialize;
use validator::Validate;

pub use persistence::db::DatabaseConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Thresholds the metric computations are calibrated against.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MetricsConfig {
    /// Weekly playtime in hours considered fully active for the activity
    /// index.
    #[serde(default = "default_active_playtime_threshold_hours")]
    #[validate(range(min = 1))]
    pub active_playtime_threshold_hours: i64,

    /// Expected spacing of TPS samples in seconds; larger gaps count as
    /// downtime.
    #[serde(default = "default_tps_max_interval_secs")]
    #[validate(range(min = 1))]
    pub tps_max_interval_secs: i64,

    /// TPS below this value counts as a low-TPS spike.
    #[serde(default = "default_low_tps_threshold")]
    #[validate(range(min = 0.0))]
    pub low_tps_threshold: f64,

    /// Minimum time between a player's first and last session to count them
    /// as retained.
    #[serde(default = "default_retention_days")]
    #[validate(range(min = 1))]
    pub retention_days: i64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            active_playtime_threshold_hours: default_active_playtime_threshold_hours(),
            tps_max_interval_secs: default_tps_max_interval_secs(),
            low_tps_threshold: default_low_tps_threshold(),
            retention_days: default_retention_days(),
        }
    }
}

impl MetricsConfig {
    pub fn active_playtime_threshold_ms(&self) -> i64 {
        self.active_playtime_threshold_hours * shared::time::HOUR_MS
    }

    pub fn tps_max_interval_ms(&self) -> i64 {
        self.tps_max_interval_secs * shared::time::SECOND_MS
    }

    pub fn retention_ms(&self) -> i64 {
        self.retention_days * shared::time::DAY_MS
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_active_playtime_threshold_hours() -> i64 {
    5
}
fn default_tps_max_interval_secs() -> i64 {
    60
}
fn default_low_tps_threshold() -> f64 {
    18.0
}
fn default_retention_days() -> i64 {
    7
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PT__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PT").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// This method creates a config entirely from defaults and overrides,
    /// without relying on config files (which may not be accessible during tests).
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        // Embed defaults directly to avoid file system dependency in tests
        let defaults = r#"
            [database]
            url = ""
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [metrics]
            active_playtime_threshold_hours = 5
            tps_max_interval_secs = 60
            low_tps_threshold = 18.0
            retention_days = 7
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        // Database URL is required
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PT__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if persistence::db::Dialect::from_url(&self.database.url).is_none() {
            return Err(ConfigValidationError::InvalidValue(format!(
                "unsupported database url scheme in {}",
                self.database.url
            )));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        Validate::validate(&self.metrics)
            .map_err(|e| ConfigValidationError::InvalidValue(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[("database.url", "sqlite::memory:")])
            .expect("Failed to load config");

        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.metrics.low_tps_threshold, 18.0);
        assert_eq!(config.metrics.retention_days, 7);
    }

    #[test]
    fn test_config_override() {
        let config = Config::load_for_test(&[
            ("database.url", "mysql://root@localhost/playtrack"),
            ("logging.level", "debug"),
            ("metrics.low_tps_threshold", "15.0"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.metrics.low_tps_threshold, 15.0);
    }

    #[test]
    fn test_config_validation_missing_db_url() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PT__DATABASE__URL"));
    }

    #[test]
    fn test_config_validation_unknown_scheme() {
        let config = Config::load_for_test(&[("database.url", "postgres://x/y")])
            .expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_invalid_pool_settings() {
        let config = Config::load_for_test(&[
            ("database.url", "sqlite::memory:"),
            ("database.min_connections", "100"),
            ("database.max_connections", "10"),
        ])
        .expect("Failed to load config");

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_connections"));
    }

    #[test]
    fn threshold_conversions() {
        let metrics = MetricsConfig::default();
        assert_eq!(
            metrics.active_playtime_threshold_ms(),
            5 * shared::time::HOUR_MS
        );
        assert_eq!(metrics.tps_max_interval_ms(), 60 * shared::time::SECOND_MS);
        assert_eq!(metrics.retention_ms(), 7 * shared::time::DAY_MS);
    }
}
