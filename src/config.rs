use chrono::Duration;
use serde::Deserialize;
use std::path::Path;

use crate::core::generator::{DEFAULT_MAX_PER_DAY, DEFAULT_SEED};
use crate::signals::DEFAULT_THRESHOLD;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 29;
pub const DEFAULT_MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub generator: GeneratorConfig,
    pub alerts: AlertConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seed used when a request omits `seed`.
    pub default_seed: i64,
    pub max_per_day: u32,
    /// Days before `to` used when a request omits `from`.
    pub lookback_days: i64,
    /// Longest accepted request range, counted in generated days.
    pub max_range_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertConfig {
    pub threshold: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_seed: DEFAULT_SEED,
            max_per_day: DEFAULT_MAX_PER_DAY,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

impl GeneratorConfig {
    /// `lookback_days` as a duration. Values that are negative or would not
    /// fit within `max_range_days` fall back to the default.
    pub fn lookback(&self) -> Duration {
        let days = self.lookback_days;
        if (0..self.max_range_days).contains(&days) {
            if let Some(lookback) = Duration::try_days(days) {
                return lookback;
            }
        }
        tracing::warn!(
            lookback_days = days,
            max_range_days = self.max_range_days,
            "lookback_days out of range, using {DEFAULT_LOOKBACK_DAYS}"
        );
        Duration::days(DEFAULT_LOOKBACK_DAYS)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.generator.default_seed, 42);
        assert_eq!(config.generator.max_per_day, 60);
        assert_eq!(config.generator.lookback_days, 29);
        assert_eq!(config.generator.max_range_days, 366);
        assert_eq!(config.alerts.threshold, 0.08);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [server]
            port = 8080

            [alerts]
            threshold = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.alerts.threshold, 0.1);
        assert_eq!(config.generator.max_per_day, 60);
    }

    #[test]
    fn empty_file_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.generator.default_seed, 42);
    }

    #[test]
    fn bad_type_is_error() {
        assert!(Config::parse("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn lookback_within_range_is_used() {
        let config = Config::parse("[generator]\nlookback_days = 6").unwrap();
        assert_eq!(config.generator.lookback(), Duration::days(6));
        assert_eq!(config.generator.max_range_days, 366);
    }

    #[test]
    fn bad_lookback_falls_back_to_default() {
        for days in [-5, i64::MAX, 366, 10_000] {
            let generator = GeneratorConfig {
                lookback_days: days,
                ..GeneratorConfig::default()
            };
            assert_eq!(generator.lookback(), Duration::days(DEFAULT_LOOKBACK_DAYS), "{days}");
        }
    }

    #[test]
    fn missing_file_falls_back() {
        let config = Config::load("/nonexistent/remitradar.toml");
        assert_eq!(config.server.port, 3000);
    }
}
