use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::store::Market;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(val: LogLevel) -> Self {
        match val {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}

/// Top-level application configuration.
///
/// Loaded with the following precedence (lowest to highest):
/// 1) Built-in defaults
/// 2) Optional config file (if present)
/// 3) Environment variables prefixed `MATCHING_`, nested keys separated by
///    `__` (e.g. `MATCHING_LOGGER__LEVEL=debug`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub logger: LogConfig,
    /// Markets known to the in-memory market source
    #[serde(default)]
    pub markets: Vec<Market>,
    /// JSON array of persisted orders replayed at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backlog_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(config_path: &Path) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if config_path.exists() {
            figment = figment.merge(Toml::file(config_path));
        }
        figment = figment.merge(Env::prefixed("MATCHING_").split("__"));

        let cfg = figment.extract()?;
        Ok(cfg)
    }

    /// Configured markets that are enabled
    pub fn enabled_markets(&self) -> impl Iterator<Item = &Market> {
        self.markets.iter().filter(|m| m.is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MarketState;
    use rust_decimal::Decimal;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = AppConfig::load(Path::new("/nonexistent/matching.toml")).unwrap();

        assert_eq!(cfg.logger.level, LogLevel::Info);
        assert_eq!(cfg.logger.format, LogFormat::Compact);
        assert!(cfg.markets.is_empty());
        assert!(cfg.backlog_path.is_none());
    }

    #[test]
    fn test_load_markets_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
backlog_path = "orders.json"

[logger]
level = "debug"
format = "json"

[[markets]]
symbol = "btcusd"
fee = "0.001"

[[markets]]
symbol = "ethusd"
state = "disabled"
"#
        )
        .unwrap();

        let cfg = AppConfig::load(file.path()).unwrap();

        assert_eq!(cfg.logger.level, LogLevel::Debug);
        assert_eq!(cfg.logger.format, LogFormat::Json);
        assert_eq!(cfg.backlog_path, Some(PathBuf::from("orders.json")));
        assert_eq!(cfg.markets.len(), 2);
        assert_eq!(cfg.markets[0].fee, Decimal::new(1, 3));
        assert_eq!(cfg.markets[1].state, MarketState::Disabled);

        let enabled: Vec<&str> = cfg.enabled_markets().map(|m| m.symbol.as_str()).collect();
        assert_eq!(enabled, vec!["btcusd"]);
    }

    #[test]
    fn test_level_filter_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
    }
}
