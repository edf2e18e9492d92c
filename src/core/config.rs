//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Tracing backend configuration.
    pub tempo: TempoConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Grafana Tempo connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempoConfig {
    /// Base URL of the Tempo HTTP API, without a trailing slash.
    pub base_url: String,

    /// Timeout for a single backend request, in seconds.
    pub timeout_secs: u64,
}

impl TempoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub const DEFAULT_TEMPO_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TEMPO_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "tempo-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            tempo: TempoConfig::default(),
        }
    }
}

impl LoggingConfig {
    /// Read `MCP_LOG_LEVEL` and `MCP_LOG_TIMESTAMPS`.
    ///
    /// Logging is configured before the rest of [`Config`] so that warnings
    /// raised while loading the remaining settings are visible.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut logging = Config::default().logging;

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            logging.with_timestamps = timestamps.to_lowercase() != "false" && timestamps != "0";
        }

        logging
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Server settings are prefixed with `MCP_`, for example
    /// `MCP_SERVER_NAME` or `MCP_LOG_LEVEL`. The Tempo URL is read from
    /// `MCP_TEMPO_URL`, falling back to `TEMPO_URL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self {
            logging: LoggingConfig::from_env(),
            ..Self::default()
        };

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(url) = std::env::var("MCP_TEMPO_URL")
            .or_else(|_| std::env::var("TEMPO_URL"))
            .ok()
            .filter(|url| !url.trim().is_empty())
        {
            config.tempo.base_url = url.trim().trim_end_matches('/').to_string();
            info!("Tempo URL loaded from environment: {}", config.tempo.base_url);
        } else {
            warn!(
                "MCP_TEMPO_URL not set - using default Tempo URL {}",
                config.tempo.base_url
            );
        }

        if let Ok(timeout) = std::env::var("MCP_TEMPO_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => config.tempo.timeout_secs = secs,
                _ => warn!(
                    "Ignoring invalid MCP_TEMPO_TIMEOUT_SECS={:?}, using {}s",
                    timeout, config.tempo.timeout_secs
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    const TEMPO_VARS: [&str; 3] = ["MCP_TEMPO_URL", "TEMPO_URL", "MCP_TEMPO_TIMEOUT_SECS"];

    fn clear_tempo_vars() {
        for var in TEMPO_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_default_tempo_config() {
        let config = Config::default();
        assert_eq!(config.tempo.base_url, "http://localhost:8080");
        assert_eq!(config.tempo.timeout(), Duration::from_secs(30));
        assert_eq!(config.server.name, "tempo-mcp-server");
    }

    #[test]
    fn test_tempo_url_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_tempo_vars();
        unsafe {
            std::env::set_var("MCP_TEMPO_URL", "http://tempo.internal:3200/");
            std::env::set_var("TEMPO_URL", "http://ignored:3200");
        }
        let config = Config::from_env();
        assert_eq!(config.tempo.base_url, "http://tempo.internal:3200");
        clear_tempo_vars();
    }

    #[test]
    fn test_tempo_url_fallback_variable() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_tempo_vars();
        unsafe {
            std::env::set_var("TEMPO_URL", "http://localhost:3200");
        }
        let config = Config::from_env();
        assert_eq!(config.tempo.base_url, "http://localhost:3200");
        clear_tempo_vars();
    }

    #[test]
    fn test_timeout_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_tempo_vars();
        unsafe {
            std::env::set_var("MCP_TEMPO_TIMEOUT_SECS", "5");
        }
        assert_eq!(Config::from_env().tempo.timeout_secs, 5);

        unsafe {
            std::env::set_var("MCP_TEMPO_TIMEOUT_SECS", "soon");
        }
        assert_eq!(Config::from_env().tempo.timeout_secs, DEFAULT_TIMEOUT_SECS);

        unsafe {
            std::env::set_var("MCP_TEMPO_TIMEOUT_SECS", "0");
        }
        assert_eq!(Config::from_env().tempo.timeout_secs, DEFAULT_TIMEOUT_SECS);
        clear_tempo_vars();
    }

    #[test]
    fn test_logging_config_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_LOG_LEVEL", "debug");
            std::env::set_var("MCP_LOG_TIMESTAMPS", "false");
        }
        let logging = LoggingConfig::from_env();
        assert_eq!(logging.level, "debug");
        assert!(!logging.with_timestamps);
        assert_eq!(Config::from_env().logging.level, "debug");

        unsafe {
            std::env::remove_var("MCP_LOG_LEVEL");
            std::env::remove_var("MCP_LOG_TIMESTAMPS");
        }
        let logging = LoggingConfig::from_env();
        assert_eq!(logging.level, "info");
        assert!(logging.with_timestamps);
    }
}
