//! Service configuration
//!
//! Loaded from a TOML file (default `config/config.toml`, or the path in
//! `CURRENCY_HUB_CONFIG`), then overridden field by field from environment
//! variables. A missing file falls back to defaults; a malformed one is fatal.

use crate::error::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const CONFIG_PATH_ENV: &str = "CURRENCY_HUB_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCfg {
    pub path: PathBuf,
    pub pool_size: u32,
    pub connect_attempts: u32,
    pub connect_backoff_secs: u64,
}

impl Default for DatabaseCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/currency_hub.db"),
            pool_size: 8,
            connect_attempts: 5,
            connect_backoff_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramCfg {
    pub token: String,
    pub api_url: String,
    pub poll_timeout_secs: u64,
}

impl Default for TelegramCfg {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoinGeckoCfg {
    /// Demo API key; requests go out unauthenticated when empty
    pub api_key: String,
    pub base_url: String,
    pub fetch_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for CoinGeckoCfg {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            fetch_interval_secs: 300,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingCfg {
    /// Optional log file, written in addition to stdout
    pub file: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingCfg {
    fn default() -> Self {
        Self {
            file: None,
            filter: "currency_hub=info,tower_http=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierCfg {
    pub tick_secs: u64,
    /// Interval used by `/start_auto` without an argument
    pub default_interval_minutes: u32,
}

impl Default for NotifierCfg {
    fn default() -> Self {
        Self {
            tick_secs: 60,
            default_interval_minutes: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseCfg,
    pub telegram: TelegramCfg,
    pub coingecko: CoinGeckoCfg,
    pub server: ServerCfg,
    pub logging: LoggingCfg,
    pub notifier: NotifierCfg,
}

impl Config {
    /// Load from the configured path, apply environment overrides and validate
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::from_file_or_default(Path::new(&path))?;
        cfg.apply_overrides(|name| env::var(name).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Logging is not up yet at this point
            eprintln!(
                "config file {} not found, using defaults and environment",
                path.display()
            );
            return Ok(Self::default());
        }

        let s = fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Overlay values from `lookup` (normally the process environment).
    ///
    /// A set but unparseable numeric value is an error.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(v) = get("DB_PATH") {
            self.database.path = PathBuf::from(v);
        }
        if let Some(v) = get("DB_POOL_SIZE") {
            self.database.pool_size = parse_number("DB_POOL_SIZE", &v)?;
        }
        if let Some(v) = get("TELEGRAM_TOKEN") {
            self.telegram.token = v;
        }
        if let Some(v) = get("COINGECKO_API_KEY") {
            self.coingecko.api_key = v;
        }
        if let Some(v) = get("COINGECKO_BASE_URL") {
            self.coingecko.base_url = v;
        }
        if let Some(v) = get("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("SERVER_PORT") {
            self.server.port = parse_number("SERVER_PORT", &v)?;
        }
        if let Some(v) = get("LOG_FILE") {
            self.logging.file = Some(PathBuf::from(v));
        }
        if let Some(v) = get("LOG_FILTER") {
            self.logging.filter = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.token.trim().is_empty() {
            return Err(AppError::Config(
                "telegram token is required (set TELEGRAM_TOKEN)".to_string(),
            ));
        }
        if self.database.pool_size == 0 {
            return Err(AppError::Config("database.pool_size must be > 0".to_string()));
        }
        if self.database.connect_attempts == 0 {
            return Err(AppError::Config(
                "database.connect_attempts must be > 0".to_string(),
            ));
        }
        if self.coingecko.fetch_interval_secs == 0 {
            return Err(AppError::Config(
                "coingecko.fetch_interval_secs must be > 0".to_string(),
            ));
        }
        if self.notifier.tick_secs == 0 {
            return Err(AppError::Config("notifier.tick_secs must be > 0".to_string()));
        }
        if self.notifier.default_interval_minutes == 0 {
            return Err(AppError::Config(
                "notifier.default_interval_minutes must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.coingecko.fetch_interval_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AppError::Config(format!("{} is not a valid number: {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.database.path, PathBuf::from("data/currency_hub.db"));
        assert_eq!(cfg.coingecko.fetch_interval_secs, 300);
        assert_eq!(cfg.notifier.tick_secs, 60);
        assert_eq!(cfg.notifier.default_interval_minutes, 10);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[telegram]\ntoken = \"abc\"\n\n[server]\nport = 9090\n",
        )
        .unwrap();

        let cfg = Config::from_file_or_default(&path).unwrap();
        assert_eq!(cfg.telegram.token, "abc");
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.database.pool_size, 8);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_shipped_config_parses() {
        let cfg: Config = toml::from_str(include_str!("../config/config.toml")).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.file, None);
        assert_eq!(cfg.telegram.api_url, "https://api.telegram.org");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let cfg = Config::from_file_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        let result = Config::from_file_or_default(&path);
        assert!(matches!(result, Err(AppError::Toml(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TELEGRAM_TOKEN", " secret "),
            ("SERVER_PORT", "3000"),
            ("DB_POOL_SIZE", " 4 "),
            ("LOG_FILE", "logs/hub.log"),
            ("COINGECKO_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut cfg = Config::default();
        cfg.coingecko.api_key = "from-file".to_string();
        cfg.apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(cfg.telegram.token, "secret");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.database.pool_size, 4);
        assert_eq!(cfg.logging.file, Some(PathBuf::from("logs/hub.log")));
        assert_eq!(cfg.coingecko.api_key, "from-file");
    }

    #[test]
    fn test_unparseable_numeric_override_is_error() {
        for (name, value) in [
            ("DB_POOL_SIZE", "not-a-number"),
            ("SERVER_PORT", "80a"),
            ("SERVER_PORT", "70000"),
            ("DB_POOL_SIZE", "-1"),
        ] {
            let mut cfg = Config::default();
            let err = cfg
                .apply_overrides(|n| (n == name).then(|| value.to_string()))
                .unwrap_err();
            assert!(
                matches!(err, AppError::Config(ref msg) if msg.contains(name) && msg.contains(value)),
                "{} = {:?}",
                name,
                value
            );
            assert_eq!(cfg.database.pool_size, 8);
            assert_eq!(cfg.server.port, 8080);
        }
    }

    #[test]
    fn test_validation() {
        let cfg = Config::default();
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));

        let mut cfg = Config::default();
        cfg.telegram.token = "t".to_string();
        cfg.notifier.default_interval_minutes = 0;
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }
}
